//! Profile mutation engine: normalization, partial updates with audit
//! appends, password changes, and creation.
//!
//! Users and participants share identity fields, so one engine serves both;
//! the [`Subject`] argument names the table. Every successful update appends
//! exactly one audit row in the same transaction as the column write, which
//! is what keeps the trail in lockstep with the data.

use chrono::Utc;
use rusqlite::{Connection, ToSql};

use crate::auth::password;
use crate::db::{audit, map_unique_constraint, participants, users};
use crate::error::{Error, Result};
use crate::models::{Gender, NewParticipant, NewUser, ProfilePatch, ProfileRow, Role, Subject};

/// Validate and canonicalise a patch without touching the store. Fields keep
/// their declaration order, so the error names the first offending field.
///
/// Rules: names must not be blank once trimmed; emails must look like
/// `local@domain.tld`; phone and emergency-contact numbers are stripped of
/// formatting and must come out at exactly 10 digits; gender accepts M/F/O in
/// either case and is stored as the single uppercase letter. Address, date of
/// birth, and blood group are trimmed as-is.
pub fn normalize(patch: &ProfilePatch) -> Result<ProfilePatch> {
    let mut clean = ProfilePatch::default();

    if let Some(name) = &patch.name {
        clean.name = Some(clean_name(name)?);
    }
    if let Some(email) = &patch.email {
        clean.email = Some(clean_email(email)?);
    }
    if let Some(phone) = &patch.phone {
        clean.phone = Some(clean_phone(phone, "phone")?);
    }
    if let Some(contact) = &patch.emergency_contact {
        clean.emergency_contact = Some(clean_phone(contact, "emergency_contact")?);
    }
    if let Some(address) = &patch.address {
        clean.address = Some(address.trim().to_string());
    }
    if let Some(date_of_birth) = &patch.date_of_birth {
        clean.date_of_birth = Some(date_of_birth.trim().to_string());
    }
    if let Some(gender) = &patch.gender {
        clean.gender = Some(clean_gender(gender)?);
    }
    if let Some(blood_group) = &patch.blood_group {
        clean.blood_group = Some(blood_group.trim().to_string());
    }

    Ok(clean)
}

fn clean_name(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            field: "name",
            problem: "cannot be blank",
        });
    }

    Ok(trimmed.to_string())
}

fn clean_email(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !valid_email(trimmed) {
        return Err(Error::Validation {
            field: "email",
            problem: "is not a valid address",
        });
    }

    Ok(trimmed.to_string())
}

/// Form-level email shape check: one `@`, a non-empty local part, and a dot
/// somewhere inside the domain. Deliverability is the mail system's problem.
fn valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.find('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}

/// Strip formatting (spaces, dashes, parentheses) and insist on a 10-digit
/// number, so "(987) 654-3210" and "9876543210" store identically.
fn clean_phone(value: &str, field: &'static str) -> Result<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return Err(Error::Validation {
            field,
            problem: "must contain exactly 10 digits",
        });
    }

    Ok(digits)
}

fn clean_gender(value: &str) -> Result<String> {
    match Gender::parse(value.trim()) {
        Some(gender) => Ok(gender.as_str().to_string()),
        None => Err(Error::Validation {
            field: "gender",
            problem: "must be M, F, or O",
        }),
    }
}

/// Apply a partial update to a live user or participant row and record who
/// did it. The column writes and the audit append commit together or not at
/// all. An all-`None` patch is a no-op returning `Ok(0)`; a non-empty patch
/// that matches no live row is `NotFound`.
pub(crate) fn update(
    conn: &mut Connection,
    subject: Subject,
    id: i64,
    patch: &ProfilePatch,
    actor: i64,
) -> Result<usize> {
    let clean = normalize(patch)?;
    if clean.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let changed = apply_patch(&tx, subject, id, &clean)?;
    if changed == 0 {
        return Err(Error::NotFound(subject.as_str()));
    }
    assert!(changed == 1, "id lookups must match at most one row");

    audit::append(&tx, subject, id, actor, Utc::now())?;
    tx.commit()?;

    Ok(changed)
}

/// Build and run the UPDATE for exactly the present fields.
fn apply_patch(
    conn: &Connection,
    subject: Subject,
    id: i64,
    patch: &ProfilePatch,
) -> Result<usize> {
    let fields: [(&str, &Option<String>); 8] = [
        ("name", &patch.name),
        ("email", &patch.email),
        ("phone", &patch.phone),
        ("emergency_contact", &patch.emergency_contact),
        ("address", &patch.address),
        ("date_of_birth", &patch.date_of_birth),
        ("gender", &patch.gender),
        ("blood_group", &patch.blood_group),
    ];

    let mut assignments: Vec<String> = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();
    for (column, value) in fields {
        if let Some(value) = value {
            assignments.push(format!("{column} = ?{}", values.len() + 1));
            values.push(value);
        }
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{} AND is_deleted = 0",
        subject.table(),
        assignments.join(", "),
        values.len() + 1
    );
    values.push(&id);

    let changed = conn
        .execute(&sql, values.as_slice())
        .map_err(map_unique_constraint)?;

    Ok(changed)
}

/// Replace a user's password after proving they know the current one. Not a
/// profile edit: the audit trail is untouched.
pub(crate) fn change_password(conn: &Connection, user_id: i64, old: &str, new: &str) -> Result<()> {
    let digest = users::password_hash(conn, user_id)?.ok_or(Error::NotFound("user"))?;
    if !password::verify(old, &digest) {
        return Err(Error::InvalidCredential);
    }
    if !password::is_strong(new) {
        return Err(Error::Validation {
            field: "password",
            problem: password::WEAK_PASSWORD,
        });
    }

    let new_digest = password::hash(new)?;
    let changed = users::update_password_hash(conn, user_id, &new_digest)?;
    if changed == 0 {
        return Err(Error::NotFound("user"));
    }
    tracing::info!(user_id, "password changed");

    Ok(())
}

/// Create an OPERATOR account. Runs the full normalization over the input,
/// requires every identity field, and checks password strength before
/// hashing. Creation is not a profile edit, so no audit entry is written.
pub(crate) fn create_user(conn: &Connection, input: &NewUser) -> Result<i64> {
    let row = validated_row(&input.as_patch())?;
    let id = insert_with_password(conn, &row, Role::Operator, &input.password)?;
    tracing::info!(id, name = %row.name, "user created");

    Ok(id)
}

/// Register a participant. Same validation as user creation minus the
/// credential.
pub(crate) fn create_participant(conn: &Connection, input: &NewParticipant) -> Result<i64> {
    let row = validated_row(&input.as_patch())?;
    let id = participants::insert_participant(conn, &row)?;
    tracing::info!(id, name = %row.name, "participant created");

    Ok(id)
}

/// Provision the OWNER account. Idempotent: when an owner already exists its
/// id comes back and the input is ignored, so bootstrap code can call this on
/// every start. This is the only way an OWNER row is ever created.
pub fn seed_owner(conn: &Connection, input: &NewUser) -> Result<i64> {
    if let Some(existing) = users::owner_id(conn)? {
        return Ok(existing);
    }

    let row = validated_row(&input.as_patch())?;
    let id = insert_with_password(conn, &row, Role::Owner, &input.password)?;
    tracing::info!(id, "owner account seeded");

    Ok(id)
}

/// Normalize a creation input and then insist every identity field survived
/// with a value.
fn validated_row(patch: &ProfilePatch) -> Result<ProfileRow> {
    let clean = normalize(patch)?;

    Ok(ProfileRow {
        name: required("name", clean.name)?,
        email: required("email", clean.email)?,
        phone: required("phone", clean.phone)?,
        emergency_contact: required("emergency_contact", clean.emergency_contact)?,
        address: required("address", clean.address)?,
        date_of_birth: required("date_of_birth", clean.date_of_birth)?,
        gender: required("gender", clean.gender)?,
        blood_group: required("blood_group", clean.blood_group)?,
    })
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Validation {
            field,
            problem: "is required",
        }),
    }
}

fn insert_with_password(
    conn: &Connection,
    row: &ProfileRow,
    role: Role,
    password: &str,
) -> Result<i64> {
    if !password::is_strong(password) {
        return Err(Error::Validation {
            field: "password",
            problem: password::WEAK_PASSWORD,
        });
    }
    let digest = password::hash(password)?;

    users::insert_user(conn, row, role, &digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_canonicalises() {
        let patch = ProfilePatch {
            name: Some("  Asha Rao ".to_string()),
            phone: Some("(987) 654-3210".to_string()),
            gender: Some("f".to_string()),
            blood_group: Some(" O+ ".to_string()),
            ..ProfilePatch::default()
        };

        let clean = normalize(&patch).unwrap();
        assert_eq!(clean.name.as_deref(), Some("Asha Rao"));
        assert_eq!(clean.phone.as_deref(), Some("9876543210"));
        assert_eq!(clean.gender.as_deref(), Some("F"));
        assert_eq!(clean.blood_group.as_deref(), Some("O+"));
        assert!(clean.email.is_none(), "absent fields stay absent");
    }

    #[test]
    fn normalize_rejects_short_phone_numbers() {
        let patch = ProfilePatch {
            phone: Some("98765".to_string()),
            ..ProfilePatch::default()
        };

        match normalize(&patch) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "phone"),
            other => panic!("expected a phone validation error, got {other:?}"),
        }
    }

    #[test]
    fn normalize_names_the_emergency_contact_separately() {
        let patch = ProfilePatch {
            emergency_contact: Some("12345".to_string()),
            ..ProfilePatch::default()
        };

        match normalize(&patch) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "emergency_contact"),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn normalize_rejects_malformed_emails() {
        let bad_inputs = [
            "plain",
            "@nolocal.com",
            "two@@ats.com",
            "user@nodot",
            "user@.start",
            "user@end.",
            "has space@x.com",
        ];
        for bad in bad_inputs {
            let patch = ProfilePatch {
                email: Some(bad.to_string()),
                ..ProfilePatch::default()
            };
            assert!(
                matches!(normalize(&patch), Err(Error::Validation { field: "email", .. })),
                "{bad:?} should be rejected"
            );
        }

        let patch = ProfilePatch {
            email: Some(" user@example.com ".to_string()),
            ..ProfilePatch::default()
        };
        assert_eq!(
            normalize(&patch).unwrap().email.as_deref(),
            Some("user@example.com")
        );
    }

    #[test]
    fn normalize_rejects_blank_names_and_unknown_genders() {
        let blank = ProfilePatch {
            name: Some("   ".to_string()),
            ..ProfilePatch::default()
        };
        assert!(matches!(
            normalize(&blank),
            Err(Error::Validation { field: "name", .. })
        ));

        let unknown = ProfilePatch {
            gender: Some("X".to_string()),
            ..ProfilePatch::default()
        };
        assert!(matches!(
            normalize(&unknown),
            Err(Error::Validation { field: "gender", .. })
        ));
    }

    #[test]
    fn normalize_reports_the_first_offending_field_in_order() {
        let patch = ProfilePatch {
            name: Some("  ".to_string()),
            email: Some("also-bad".to_string()),
            ..ProfilePatch::default()
        };

        match normalize(&patch) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_patch_normalizes_to_empty() {
        let clean = normalize(&ProfilePatch::default()).unwrap();
        assert!(clean.is_empty());
    }
}
