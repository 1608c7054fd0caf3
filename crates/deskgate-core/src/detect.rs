//! Auto-detection heuristic for unregistered chats.
//!
//! Classifies a chat into a [`GroupType`] by case-insensitive substring
//! matching on the chat title and bot-visible username. The result only
//! ever feeds a registration *suggestion* — an unregistered chat is
//! always denied regardless of what this module says.

use crate::models::group::GroupType;
use crate::models::verdict::SuggestedGroup;

/// Title keywords mapped to a type. Vietnamese aliases come from the
/// deployments this system was built for.
const ADMIN_TITLE_KEYWORDS: &[&str] = &["admin", "quản trị"];
const SUPPLIER_TITLE_KEYWORDS: &[&str] = &["supplier", "nhà cung cấp", "ncc"];

/// Classify a chat by title and username. Pure and deterministic:
/// the same inputs always produce the same type.
pub fn detect_group_type(chat_title: Option<&str>, username: Option<&str>) -> GroupType {
    let title = chat_title.unwrap_or("").to_lowercase();
    let user = username.unwrap_or("").to_lowercase();

    if ADMIN_TITLE_KEYWORDS.iter().any(|k| title.contains(k)) || user.contains("admin") {
        GroupType::Admin
    } else if SUPPLIER_TITLE_KEYWORDS.iter().any(|k| title.contains(k))
        || user.contains("supplier")
    {
        GroupType::Supplier
    } else {
        GroupType::Customer
    }
}

/// Build the pre-filled registration payload for an unregistered chat.
pub fn suggest_group(
    chat_id: &str,
    chat_title: Option<&str>,
    username: Option<&str>,
) -> SuggestedGroup {
    let group_type = detect_group_type(chat_title, username);
    let name = chat_title
        .map(str::to_string)
        .unwrap_or_else(|| format!("Detected {} Group", group_type.as_str()));

    SuggestedGroup {
        chat_id: chat_id.to_string(),
        name,
        group_type,
        chat_title: chat_title.map(str::to_string),
        description: format!("Auto-detected {} group", group_type.role_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_title_keyword_detects_admin() {
        assert_eq!(
            detect_group_type(Some("Admin Ops"), None),
            GroupType::Admin
        );
        assert_eq!(
            detect_group_type(Some("Nhóm Quản Trị HLS"), None),
            GroupType::Admin
        );
    }

    #[test]
    fn supplier_keywords_detect_supplier() {
        assert_eq!(
            detect_group_type(Some("NCC Miền Bắc"), None),
            GroupType::Supplier
        );
        assert_eq!(
            detect_group_type(Some("Nhà cung cấp ABC"), None),
            GroupType::Supplier
        );
        assert_eq!(
            detect_group_type(None, Some("supplier_bot")),
            GroupType::Supplier
        );
    }

    #[test]
    fn username_match_detects_admin() {
        assert_eq!(
            detect_group_type(Some("Support"), Some("hls_admin")),
            GroupType::Admin
        );
    }

    #[test]
    fn everything_else_defaults_to_customer() {
        assert_eq!(detect_group_type(Some("Support VIP"), None), GroupType::Customer);
        assert_eq!(detect_group_type(None, None), GroupType::Customer);
    }

    #[test]
    fn admin_wins_over_supplier_when_both_match() {
        // Ordered match: admin keywords are checked first.
        assert_eq!(
            detect_group_type(Some("Admin NCC"), None),
            GroupType::Admin
        );
    }

    #[test]
    fn suggestion_is_deterministic_and_prefilled() {
        let a = suggest_group("-100999", Some("Admin Ops"), None);
        let b = suggest_group("-100999", Some("Admin Ops"), None);
        assert_eq!(a, b);
        assert_eq!(a.group_type, GroupType::Admin);
        assert_eq!(a.name, "Admin Ops");
        assert_eq!(a.chat_id, "-100999");
    }

    #[test]
    fn suggestion_without_title_gets_fallback_name() {
        let s = suggest_group("-100777", None, None);
        assert_eq!(s.name, "Detected CUSTOMER Group");
        assert!(s.chat_title.is_none());
    }
}
