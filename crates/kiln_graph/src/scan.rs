//! Finding `#include "..."` directives in source text.

/// Returns the targets of quoted include directives, in source order.
///
/// Angle-bracket includes name system headers and are not returned.
/// Directives inside `/* */` or after `//` are ignored; whitespace between
/// `#`, `include` and the target is allowed.
pub fn scan_includes(source: &str) -> Vec<String> {
    let mut in_block = false;
    let mut found = Vec::new();
    for line in source.lines() {
        let code = strip_comments(line, &mut in_block);
        if let Some(target) = parse_include(&code) {
            found.push(target.to_string());
        }
    }
    found
}

fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        if *in_block {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_block = false;
                    code.push(' ');
                }
                None => return code,
            }
        } else {
            let block = rest.find("/*");
            let line_comment = rest.find("//");
            match (block, line_comment) {
                (Some(b), Some(l)) if l < b => {
                    code.push_str(&rest[..l]);
                    return code;
                }
                (Some(b), _) => {
                    code.push_str(&rest[..b]);
                    rest = &rest[b + 2..];
                    *in_block = true;
                }
                (None, Some(l)) => {
                    code.push_str(&rest[..l]);
                    return code;
                }
                (None, None) => {
                    code.push_str(rest);
                    return code;
                }
            }
        }
    }
}

fn parse_include(code: &str) -> Option<&str> {
    let rest = code.trim_start().strip_prefix('#')?;
    let rest = rest.trim_start().strip_prefix("include")?;
    let rest = rest.trim_start().strip_prefix('"')?;
    let end = rest.find('"')?;
    let target = &rest[..end];
    (!target.is_empty()).then_some(target)
}
