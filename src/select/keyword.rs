use anyhow::Result;
use colored::Colorize;

use super::Operator;

/// Result of the keyword prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordOutcome {
    /// Operator accepted the filtered subset
    Accepted(Vec<String>),
    /// Operator declined, or nothing matched; back to the mode prompt
    Back,
    /// Input ended before a decision
    Aborted,
}

/// Whether `path` contains `keyword`, ignoring case; a blank keyword matches everything
pub fn matches_keyword(path: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    keyword.is_empty() || path.to_lowercase().contains(&keyword.to_lowercase())
}

/// Candidates whose path contains `keyword`, ignoring case, in original order
pub fn filter_by_keyword(candidates: &[String], keyword: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|path| matches_keyword(path, keyword))
        .cloned()
        .collect()
}

/// Interactive keyword mode: filter, list the matches, ask for confirmation
pub fn prompt(candidates: &[String], operator: &mut dyn Operator) -> Result<KeywordOutcome> {
    let Some(keyword) = operator.read_line("Enter keyword to filter files: ")? else {
        return Ok(KeywordOutcome::Aborted);
    };
    let keyword = keyword.trim();

    if keyword.is_empty() {
        return Ok(KeywordOutcome::Accepted(candidates.to_vec()));
    }

    let filtered = filter_by_keyword(candidates, keyword);
    println!(
        "Found {} files matching '{}':",
        filtered.len().to_string().cyan(),
        keyword
    );
    for (i, path) in filtered.iter().enumerate() {
        println!("  {}. {}", i + 1, path);
    }

    if filtered.is_empty() {
        println!(
            "{}",
            "No files match the keyword. Returning to main selection.".yellow()
        );
        return Ok(KeywordOutcome::Back);
    }

    let Some(answer) = operator.read_line("Sync these filtered files? [y/N]: ")? else {
        return Ok(KeywordOutcome::Aborted);
    };

    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(KeywordOutcome::Accepted(filtered)),
        _ => Ok(KeywordOutcome::Back),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::ScriptedOperator;

    fn candidates() -> Vec<String> {
        ["api/User.proto", "api/order.proto", "docs/README.md"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        assert_eq!(
            filter_by_keyword(&candidates(), "USER"),
            vec!["api/User.proto".to_string()]
        );
        assert_eq!(
            filter_by_keyword(&candidates(), "proto"),
            vec!["api/User.proto".to_string(), "api/order.proto".to_string()]
        );
    }

    #[test]
    fn test_blank_keyword_keeps_everything() {
        assert_eq!(filter_by_keyword(&candidates(), "  "), candidates());
    }

    #[test]
    fn test_prompt_accepts_on_yes() {
        let mut op = ScriptedOperator::new(["order", "YES"]);
        assert_eq!(
            prompt(&candidates(), &mut op).unwrap(),
            KeywordOutcome::Accepted(vec!["api/order.proto".to_string()])
        );
    }

    #[test]
    fn test_prompt_declined_goes_back() {
        let mut op = ScriptedOperator::new(["order", ""]);
        assert_eq!(prompt(&candidates(), &mut op).unwrap(), KeywordOutcome::Back);
    }

    #[test]
    fn test_prompt_no_match_goes_back_without_asking() {
        let mut op = ScriptedOperator::new(["nothing-matches"]);
        assert_eq!(prompt(&candidates(), &mut op).unwrap(), KeywordOutcome::Back);
        assert_eq!(op.prompts.len(), 1);
    }
}
