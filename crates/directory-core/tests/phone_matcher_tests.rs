//! Resolution behaviour of the phone matcher against directory snapshots

use chrono::Utc;
use omnicall_directory_core::{normalize, to_international, DirectoryEntry, PhoneMatcher};

fn customer(id: i64, first: &str, phone: Option<&str>) -> DirectoryEntry {
    DirectoryEntry {
        id,
        first_name: first.to_string(),
        last_name: "Patient".to_string(),
        phone: phone.map(str::to_string),
        affiliation: Some("Discovery Health".to_string()),
        plan: Some("Classic Saver".to_string()),
        company_id: None,
        created_at: Utc::now(),
    }
}

#[test]
fn test_normalize_preserves_digit_order() {
    let raw = "+1 (555) 010-9988 ext. 42";
    let normalized = normalize(raw);
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    assert_eq!(normalized, format!("+{}", digits));
}

#[test]
fn test_separator_only_differences_match() {
    let directory = vec![
        customer(1, "Alice", Some("555 123 4567")),
        customer(2, "Bongani", Some("(555) 987-6543")),
    ];
    let matcher = PhoneMatcher::new();

    let hit = matcher.resolve("555.987.6543", &directory).unwrap();
    assert_eq!(hit.id, 2);
}

#[test]
fn test_exact_match_wins_over_earlier_normalized_match() {
    // Entry 1 normalizes to the same digits but entry 2 is stored verbatim
    let directory = vec![
        customer(1, "Alice", Some("555-123-4567")),
        customer(2, "Alicia", Some("5551234567")),
    ];
    let matcher = PhoneMatcher::new();

    assert_eq!(matcher.resolve("5551234567", &directory).unwrap().id, 2);
    assert_eq!(matcher.resolve("555-123-4567", &directory).unwrap().id, 1);
}

#[test]
fn test_every_stored_number_resolves_to_itself() {
    let directory = vec![
        customer(1, "A", Some("0672966361")),
        customer(2, "B", Some("067 296 6361")),
        customer(3, "C", Some("+27 67 296 6361")),
    ];
    let matcher = PhoneMatcher::with_country_code("27");

    for entry in &directory {
        let raw = entry.phone.as_deref().unwrap();
        assert_eq!(matcher.resolve(raw, &directory).unwrap().id, entry.id);
    }
}

#[test]
fn test_ties_resolve_to_first_in_directory_order() {
    let directory = vec![
        customer(9, "Newest", Some("082 555 0000")),
        customer(4, "Older", Some("082-555-0000")),
    ];
    let matcher = PhoneMatcher::new();

    assert_eq!(matcher.resolve("0825550000", &directory).unwrap().id, 9);
}

#[test]
fn test_country_code_conversion_before_resolve() {
    let directory = vec![customer(1, "Thandi", Some("0672966361"))];

    // Plain matcher only strips separators
    let plain = PhoneMatcher::new();
    assert!(plain.resolve("+27 67 296 6361", &directory).is_none());

    // Caller-side convention: rewrite both sides to international form
    let local = to_international("0672966361", "27");
    assert_eq!(local, normalize("+27 67 296 6361"));

    let with_cc = PhoneMatcher::with_country_code("27");
    let hit = with_cc.resolve("+27 67 296 6361", &directory).unwrap();
    assert_eq!(hit.first_name, "Thandi");
}

#[test]
fn test_entries_without_phone_never_match() {
    let directory = vec![customer(1, "NoPhone", None), customer(2, "Blank", Some(""))];
    let matcher = PhoneMatcher::with_country_code("27");

    assert!(matcher.resolve("", &directory).is_none());
    assert!(matcher.resolve("   ", &directory).is_none());
    assert!(matcher.resolve("n/a", &directory).is_none());
    assert!(matcher.resolve("+15551234567", &directory).is_none());
}

#[test]
fn test_not_found_is_none() {
    let directory = vec![customer(1, "Alice", Some("555 123 4567"))];
    assert!(PhoneMatcher::new().resolve("+15551234567", &directory).is_none());
}
