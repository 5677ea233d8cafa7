//! Include search-path extraction
//!
//! Recovers `-I`/`-isystem` directives from a compiler invocation string so
//! a standalone preprocessor run resolves headers the same way the original
//! build did.

use regex::Regex;

/// Extract include search-path directives from a command string
///
/// Directives are returned in their original order and exact spelling
/// (trailing separators included); `-isystem` keeps its argument attached
/// even when it is a separate token.
///
/// This is a plain text scan, not a shell tokenizer: an `-I` occurring
/// inside a quoted filename would also match. Accepted as a known
/// limitation.
pub fn extract_search_paths(command: &str) -> Vec<String> {
    let re = Regex::new(r"-(?:I|isystem)\s*\S+").unwrap();
    re.find_iter(command)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_attached_include() {
        let paths = extract_search_paths("g++ -I/usr/include -O2 -c main.cpp");
        assert_eq!(paths, vec!["-I/usr/include"]);
    }

    #[test]
    fn test_extract_isystem_with_separate_argument() {
        let paths =
            extract_search_paths("g++ -isystem /opt/toolchain/include -I./include -c main.cpp");
        assert_eq!(
            paths,
            vec!["-isystem /opt/toolchain/include", "-I./include"]
        );
    }

    #[test]
    fn test_order_and_spelling_preserved() {
        let paths = extract_search_paths("cc -Ib/ -Ia -isystem sys/ -c x.c");
        assert_eq!(paths, vec!["-Ib/", "-Ia", "-isystem sys/"]);
    }

    #[test]
    fn test_no_includes() {
        assert!(extract_search_paths("cc -O2 -o x.o -c x.c").is_empty());
    }
}
