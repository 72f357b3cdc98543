//! Parsing `nm -P` output.

use crate::job::ObjectSymbols;

/// Parses POSIX `nm -P` output into global defined and undefined symbols.
///
/// Each line is `name type [value [size]]`. Type `U` is undefined, other
/// upper-case types are global definitions, and lower-case types are local
/// or weak-undefined symbols and are skipped. Archive member headers
/// (`lib.a[x.o]:`) and blank lines are ignored.
pub fn parse_posix_symbols(output: &str) -> ObjectSymbols {
    let mut symbols = ObjectSymbols::default();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(kind)) = (fields.next(), fields.next()) else {
            continue;
        };
        if name.ends_with(':') {
            continue;
        }
        let mut chars = kind.chars();
        let (Some(kind), None) = (chars.next(), chars.next()) else {
            continue;
        };
        match kind {
            'U' => symbols.undefined.push(name.to_string()),
            k if k.is_ascii_uppercase() => symbols.defined.push(name.to_string()),
            _ => {}
        }
    }
    symbols
}
