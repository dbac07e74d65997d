use crate::contract::model::PartySizeInput;

/// Municipalities accepted on the registration form, matched exactly.
pub const MUNICIPALITIES: [&str; 12] = [
    "Aalborg",
    "Brønderslev",
    "Frederikshavn",
    "Hjørring",
    "Jammerbugt",
    "Læsø",
    "Mariagerfjord",
    "Morsø",
    "Rebild",
    "Thisted",
    "Vesthimmerland",
    "Anden del af Danmark",
];

pub const MIN_PARTY_SIZE: i64 = 1;
pub const MAX_PARTY_SIZE: i64 = 50;

pub const MSG_MUNICIPALITY_REQUIRED: &str = "Kommune er påkrævet";
pub const MSG_MUNICIPALITY_INVALID: &str = "Ugyldig kommune";
pub const MSG_PARTY_SIZE_REQUIRED: &str = "Antal er påkrævet";
pub const MSG_PARTY_SIZE_RANGE: &str = "Antal skal være mellem 1-50";

pub fn is_known_municipality(name: &str) -> bool {
    MUNICIPALITIES.contains(&name)
}

/// Outcome of checking a submission; empty `errors` means it passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Values that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted<'a> {
    pub municipality: &'a str,
    pub party_size: i32,
}

pub fn validate(municipality: Option<&str>, party_size: &PartySizeInput) -> Validation {
    let mut errors = Vec::new();

    match municipality {
        None | Some("") => errors.push(MSG_MUNICIPALITY_REQUIRED.to_string()),
        Some(m) if !is_known_municipality(m) => errors.push(MSG_MUNICIPALITY_INVALID.to_string()),
        Some(_) => {}
    }

    match party_size {
        PartySizeInput::Missing => errors.push(MSG_PARTY_SIZE_REQUIRED.to_string()),
        PartySizeInput::Integer(n) if (MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(n) => {}
        PartySizeInput::Integer(_) | PartySizeInput::NotInteger => {
            errors.push(MSG_PARTY_SIZE_RANGE.to_string())
        }
    }

    Validation { errors }
}

/// Validate and hand back the typed values, or the collected errors.
pub fn accept<'a>(
    municipality: Option<&'a str>,
    party_size: &PartySizeInput,
) -> Result<Accepted<'a>, Validation> {
    let validation = validate(municipality, party_size);
    match (municipality, party_size) {
        (Some(m), PartySizeInput::Integer(n)) if validation.is_valid() => {
            let party_size = i32::try_from(*n).map_err(|_| validation.clone())?;
            Ok(Accepted {
                municipality: m,
                party_size,
            })
        }
        _ => Err(validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_municipality_is_accepted() {
        for m in MUNICIPALITIES {
            assert!(validate(Some(m), &PartySizeInput::Integer(2)).is_valid(), "{m}");
        }
    }

    #[test]
    fn municipality_match_is_case_sensitive() {
        let v = validate(Some("aalborg"), &PartySizeInput::Integer(2));
        assert_eq!(v.first_error(), Some(MSG_MUNICIPALITY_INVALID));
    }

    #[test]
    fn missing_or_empty_municipality() {
        for m in [None, Some("")] {
            let v = validate(m, &PartySizeInput::Integer(2));
            assert_eq!(v.errors, vec![MSG_MUNICIPALITY_REQUIRED.to_string()]);
        }
    }

    #[test]
    fn party_size_bounds() {
        assert!(validate(Some("Rebild"), &PartySizeInput::Integer(1)).is_valid());
        assert!(validate(Some("Rebild"), &PartySizeInput::Integer(50)).is_valid());

        for bad in [0, -3, 51, i64::MAX] {
            let v = validate(Some("Rebild"), &PartySizeInput::Integer(bad));
            assert_eq!(v.first_error(), Some(MSG_PARTY_SIZE_RANGE), "{bad}");
        }

        let v = validate(Some("Rebild"), &PartySizeInput::NotInteger);
        assert_eq!(v.first_error(), Some(MSG_PARTY_SIZE_RANGE));

        let v = validate(Some("Rebild"), &PartySizeInput::Missing);
        assert_eq!(v.first_error(), Some(MSG_PARTY_SIZE_REQUIRED));
    }

    #[test]
    fn errors_are_collected_in_field_order() {
        let v = validate(Some("Nowhere"), &PartySizeInput::Missing);
        assert_eq!(
            v.errors,
            vec![
                MSG_MUNICIPALITY_INVALID.to_string(),
                MSG_PARTY_SIZE_REQUIRED.to_string()
            ]
        );
        assert!(!v.is_valid());
    }

    #[test]
    fn accept_returns_typed_values() {
        let ok = accept(Some("Aalborg"), &PartySizeInput::Integer(3)).unwrap();
        assert_eq!(ok.municipality, "Aalborg");
        assert_eq!(ok.party_size, 3);

        let err = accept(Some("Aalborg"), &PartySizeInput::Integer(0)).unwrap_err();
        assert_eq!(err.first_error(), Some(MSG_PARTY_SIZE_RANGE));
    }
}
