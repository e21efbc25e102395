//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use civseal_core::{Fingerprint, Keypair, Member, Record};

/// Generate a deterministic keypair from a random seed.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_filter_map("key generation failed", |seed| {
        Keypair::from_seed(&seed).ok()
    })
}

/// Generate a random fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a scalar field value as extraction would produce it.
pub fn scalar() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ./-]{0,16}".prop_map(String::from)
}

/// Generate a 16-digit identifier (family card number or NIK).
pub fn identifier() -> impl Strategy<Value = String> {
    "[0-9]{16}".prop_map(String::from)
}

fn member_from(nik: String, fields: Vec<String>) -> Member {
    let mut it = fields.into_iter();
    let mut next = || it.next().unwrap_or_default();
    Member {
        name: next(),
        nik,
        sex: next(),
        birth_place: next(),
        birth_date: next(),
        religion: next(),
        education: next(),
        occupation: next(),
        blood_type: next(),
        marital_status: next(),
        marriage_date: next(),
        relationship: next(),
        citizenship: next(),
        father: next(),
        mother: next(),
    }
}

/// Generate a member with the given NIK.
pub fn member_with_nik(nik: String) -> impl Strategy<Value = Member> {
    prop::collection::vec(scalar(), 14).prop_map(move |fields| member_from(nik.clone(), fields))
}

/// Generate a record with up to `max_members` members, all with distinct NIKs.
pub fn record(max_members: usize) -> impl Strategy<Value = Record> {
    (
        identifier(),
        prop::collection::vec(scalar(), 9),
        prop::collection::btree_map(
            identifier(),
            prop::collection::vec(scalar(), 14),
            0..=max_members,
        ),
    )
        .prop_map(|(id, fields, members): (String, Vec<String>, BTreeMap<String, Vec<String>>)| {
            let mut it = fields.into_iter();
            let mut next = || it.next().unwrap_or_default();
            Record {
                family_number: id,
                head_of_family: next(),
                address: next(),
                rt_rw: next(),
                postal_code: next(),
                village: next(),
                district: next(),
                regency: next(),
                province: next(),
                issued_on: next(),
                members: members
                    .into_iter()
                    .map(|(nik, fields)| member_from(nik, fields))
                    .collect(),
            }
        })
}

/// Re-case or pad one value. `choice` picks the style.
fn restyle(value: &str, choice: u64) -> String {
    match choice % 5 {
        0 => value.to_uppercase(),
        1 => value.to_lowercase(),
        2 => format!("  {}", value),
        3 => format!("{}\t ", value.to_uppercase()),
        _ => value.to_string(),
    }
}

/// Apply a per-field restyle driven by `salt`.
pub fn restyle_record(record: &Record, salt: u64) -> Record {
    let mut out = record.clone();
    let mut choice = salt;
    let mut step = |s: &mut String| {
        *s = restyle(s, choice);
        choice = choice.rotate_left(7).wrapping_add(0x9e37_79b9);
    };

    for slot in [
        &mut out.family_number,
        &mut out.head_of_family,
        &mut out.address,
        &mut out.rt_rw,
        &mut out.postal_code,
        &mut out.village,
        &mut out.district,
        &mut out.regency,
        &mut out.province,
        &mut out.issued_on,
    ] {
        step(slot);
    }
    for m in &mut out.members {
        for slot in [&mut m.name, &mut m.nik, &mut m.sex, &mut m.occupation, &mut m.mother] {
            step(slot);
        }
    }
    out
}

/// Generate presentations of `record` that must canonicalize identically:
/// members shuffled, fields re-cased and padded.
pub fn presentation_variant(record: Record) -> impl Strategy<Value = Record> {
    let members = record.members.clone();
    (Just(members).prop_shuffle(), any::<u64>()).prop_map(move |(members, salt)| {
        let shuffled = Record {
            members,
            ..record.clone()
        };
        restyle_record(&shuffled, salt)
    })
}

/// Generate a record together with one of its presentation variants.
pub fn record_and_variant() -> impl Strategy<Value = (Record, Record)> {
    record(4).prop_flat_map(|r| {
        let original = r.clone();
        presentation_variant(r).prop_map(move |variant| (original.clone(), variant))
    })
}
