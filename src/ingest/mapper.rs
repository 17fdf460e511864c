//! Row to user record mapping

use super::error::MapError;
use super::parser::RawRow;
use crate::models::UserRecord;

pub const FIRST_NAME_KEY: &str = "name.firstName";
pub const LAST_NAME_KEY: &str = "name.lastName";
pub const AGE_KEY: &str = "age";
pub const ADDRESS_PREFIX: &str = "address.";

/// Convert one parsed row into a user record
///
/// The name is the first and last name joined with one space, with absent
/// parts taken as empty, so a row with neither yields `" "`. Every other
/// column whose trimmed value is non-empty goes to `address` (for
/// `address.*` headers, prefix stripped) or to `additional_info`.
pub fn map_record(row: &RawRow) -> Result<UserRecord, MapError> {
    let first_name = row.get(FIRST_NAME_KEY).unwrap_or("");
    let last_name = row.get(LAST_NAME_KEY).unwrap_or("");
    let raw_age = row.get(AGE_KEY).unwrap_or("");

    let age = raw_age
        .trim()
        .parse::<i32>()
        .map_err(|source| MapError::InvalidAge {
            value: raw_age.to_string(),
            source,
        })?;

    let mut record = UserRecord::new(format!("{} {}", first_name, last_name), age);

    for (key, value) in row.iter() {
        if key.is_empty() || matches!(key, FIRST_NAME_KEY | LAST_NAME_KEY | AGE_KEY) {
            continue;
        }

        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.strip_prefix(ADDRESS_PREFIX) {
            Some(field) => record.address.insert(field.to_string(), value.to_string()),
            None => record
                .additional_info
                .insert(key.to_string(), value.to_string()),
        };
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_basic_record() {
        let record = map_record(&row(&[
            ("name.firstName", "John"),
            ("name.lastName", "Doe"),
            ("age", "25"),
            ("address.city", "NYC"),
        ]))
        .unwrap();

        assert_eq!(record.name, "John Doe");
        assert_eq!(record.age, 25);
        assert_eq!(
            record.address,
            FieldMap::from([("city".to_string(), "NYC".to_string())])
        );
        assert!(record.additional_info.is_empty());
    }

    #[test]
    fn test_name_concatenation_is_not_cleaned() {
        let only_first = map_record(&row(&[("name.firstName", "Ann"), ("age", "1")])).unwrap();
        assert_eq!(only_first.name, "Ann ");

        let only_last = map_record(&row(&[("name.lastName", "Lee"), ("age", "1")])).unwrap();
        assert_eq!(only_last.name, " Lee");

        let neither = map_record(&row(&[("age", "1")])).unwrap();
        assert_eq!(neither.name, " ");
    }

    #[test]
    fn test_other_columns_go_to_additional_info() {
        let record = map_record(&row(&[
            ("age", "30"),
            ("email", "x@y.com"),
            ("name.middle", "Q"),
        ]))
        .unwrap();

        assert_eq!(
            record.additional_info.get("email").map(String::as_str),
            Some("x@y.com")
        );
        assert_eq!(
            record.additional_info.get("name.middle").map(String::as_str),
            Some("Q")
        );
        assert!(!record.additional_info.contains_key("age"));
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let record = map_record(&row(&[
            ("age", "30"),
            ("address.line2", "   "),
            ("address.city", "Oslo"),
            ("gender", ""),
        ]))
        .unwrap();

        assert_eq!(record.address.len(), 1);
        assert!(!record.address.contains_key("line2"));
        assert!(record.additional_info.is_empty());
    }

    #[test]
    fn test_address_prefix_stripped_once() {
        let record = map_record(&row(&[("age", "30"), ("address.address.zip", "0150")])).unwrap();
        assert_eq!(
            record.address.get("address.zip").map(String::as_str),
            Some("0150")
        );
    }

    #[test]
    fn test_negative_and_large_ages_are_accepted() {
        assert_eq!(map_record(&row(&[("age", "-4")])).unwrap().age, -4);
        assert_eq!(map_record(&row(&[("age", "250")])).unwrap().age, 250);
    }

    #[test]
    fn test_invalid_age() {
        for bad in ["abc", "", "25.5", "25abc"] {
            let err = map_record(&row(&[("age", bad)])).unwrap_err();
            let MapError::InvalidAge { value, .. } = err;
            assert_eq!(value, bad);
        }
    }

    #[test]
    fn test_missing_age_column_is_invalid() {
        assert!(map_record(&row(&[("name.firstName", "Ann")])).is_err());
    }
}
