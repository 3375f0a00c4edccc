//! Naive statement splitting
//!
//! Used under emulated execution when a backend cannot run a compound
//! script in a single call. The splitter is purely lexical: it carries
//! no quote or comment state, so a `;` inside a string literal or a
//! dialect-specific quoted block will incorrectly terminate a
//! statement. That limitation is deliberate and documented.

const END_OF_STATEMENT: char = ';';

/// Split `script` into individual statements on literal `;` delimiters.
///
/// Characters are copied verbatim. A fragment that is empty after
/// trimming surrounding whitespace is discarded; end of input closes
/// the final fragment under the same rule.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut statement = String::new();

    for ch in script.chars() {
        if ch == END_OF_STATEMENT {
            if statement.trim().is_empty() {
                statement.clear();
            } else {
                statements.push(std::mem::take(&mut statement));
            }
        } else {
            statement.push(ch);
        }
    }

    if !statement.trim().is_empty() {
        statements.push(statement);
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_and_drops_empty_fragments() {
        let statements = split_statements("select 1; select 2;;  ");
        assert_eq!(statements, vec!["select 1", " select 2"]);
    }

    #[test]
    fn unterminated_final_statement_is_kept() {
        let statements = split_statements("select 1;\nselect 2");
        assert_eq!(statements, vec!["select 1", "\nselect 2"]);
    }

    #[test]
    fn empty_input_yields_no_statements() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("  \n\t ").is_empty());
        assert!(split_statements(";;;").is_empty());
    }

    #[test]
    fn contents_are_copied_verbatim() {
        let statements = split_statements("create table t (\n  id int\n);\n");
        assert_eq!(statements, vec!["create table t (\n  id int\n)"]);
    }

    #[test]
    fn semicolon_inside_string_literal_still_splits() {
        // Known limitation: the splitter is not quote-aware.
        let statements = split_statements("insert into t values ('a;b');");
        assert_eq!(statements.len(), 2);
    }
}
