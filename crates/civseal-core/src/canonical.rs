//! Canonical JSON encoding for deterministic fingerprints.
//!
//! The encoding is:
//! - Every scalar trimmed and lowercased, members sorted by NIK
//! - Object keys sorted by byte comparison
//! - Every known key always present (missing fields are `""`)
//! - `", "` between items and `": "` between key and value
//! - UTF-8 text, only `"`, `\` and control characters escaped
//!
//! The same logical record produces identical bytes (and thus an identical
//! fingerprint) regardless of member order, letter case, or surrounding
//! whitespace in its fields.

use serde_json::Value;

use crate::crypto::Fingerprint;
use crate::error::CoreError;
use crate::record::{keys, Member, Record};

/// Encode a record to canonical bytes.
pub fn canonical_bytes(record: &Record) -> Vec<u8> {
    let normalized = record.normalized();
    let node = record_to_node(&normalized);
    let mut buf = Vec::with_capacity(256 + normalized.members.len() * 384);
    encode_node_to(&mut buf, &node);
    buf
}

/// Encode loosely-typed record data to canonical bytes.
///
/// Fails with [`CoreError::InvalidRecord`] if the value is not record-shaped.
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, CoreError> {
    let record = Record::from_value(value)?;
    Ok(canonical_bytes(&record))
}

/// Fingerprint of a record: BLAKE3 over its canonical bytes.
pub fn fingerprint(record: &Record) -> Fingerprint {
    Fingerprint::digest(&canonical_bytes(record))
}

/// Intermediate tree. Maps hold static keys; sorting happens at encode time.
enum Node<'a> {
    Text(&'a str),
    Array(Vec<Node<'a>>),
    Map(Vec<(&'static str, Node<'a>)>),
}

fn record_to_node(record: &Record) -> Node<'_> {
    let mut entries: Vec<(&'static str, Node<'_>)> = record
        .fields()
        .into_iter()
        .map(|(k, v)| (k, Node::Text(v)))
        .collect();

    let members = record.members.iter().map(member_to_node).collect();
    entries.push((keys::MEMBERS, Node::Array(members)));

    Node::Map(entries)
}

fn member_to_node(member: &Member) -> Node<'_> {
    Node::Map(
        member
            .fields()
            .into_iter()
            .map(|(k, v)| (k, Node::Text(v)))
            .collect(),
    )
}

fn encode_node_to(buf: &mut Vec<u8>, node: &Node<'_>) {
    match node {
        Node::Text(s) => encode_text(buf, s),
        Node::Array(items) => encode_array(buf, items),
        Node::Map(entries) => encode_map_canonical(buf, entries),
    }
}

fn encode_array(buf: &mut Vec<u8>, items: &[Node<'_>]) {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b", ");
        }
        encode_node_to(buf, item);
    }
    buf.push(b']');
}

/// Encode an object with keys sorted by byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(&'static str, Node<'_>)]) {
    let mut sorted: Vec<&(&'static str, Node<'_>)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push(b'{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b", ");
        }
        encode_text(buf, key);
        buf.extend_from_slice(b": ");
        encode_node_to(buf, value);
    }
    buf.push(b'}');
}

/// Encode a JSON string. Non-ASCII text is written as raw UTF-8.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        Record {
            family_number: "3201010101010001".into(),
            head_of_family: "BUDI SANTOSO".into(),
            address: "JL. MERDEKA NO. 1".into(),
            members: vec![
                Member {
                    name: "SITI AMINAH".into(),
                    nik: "3201010101010003".into(),
                    ..Default::default()
                },
                Member {
                    name: "BUDI SANTOSO".into(),
                    nik: "3201010101010002".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_canonical_encoding_deterministic() {
        let record = sample();
        assert_eq!(canonical_bytes(&record), canonical_bytes(&record));
    }

    #[test]
    fn test_canonical_ignores_member_order_case_whitespace() {
        let a = sample();

        let mut b = sample();
        b.members.reverse();
        b.head_of_family = "  budi santoso\t".into();
        b.members[0].name = "Budi Santoso ".into();

        assert_eq!(canonical_bytes(&a), canonical_bytes(&b));
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_canonical_detects_content_change() {
        let a = sample();
        let mut b = sample();
        b.members[1].name = "BUDI SANTOSA".into();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_empty_record_layout() {
        let bytes = canonical_bytes(&Record::default());
        let expected = concat!(
            r#"{"alamat": "", "anggota_keluarga": [], "desa_kelurahan": "", "#,
            r#""kabupaten_kota": "", "kecamatan": "", "kepala_keluarga": "", "#,
            r#""kode_pos": "", "nomor_kk": "", "provinsi": "", "rt_rw": "", "#,
            r#""tanggal_terbit": ""}"#
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_member_layout_sorted_keys() {
        let record = Record {
            members: vec![Member {
                name: "Ani".into(),
                nik: "1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let text = String::from_utf8(canonical_bytes(&record)).unwrap();
        let expected_member = concat!(
            r#"{"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "#,
            r#""jenis_kelamin": "", "kewarganegaraan": "", "nama": "ani", "#,
            r#""nik": "1", "pekerjaan": "", "pendidikan": "", "#,
            r#""status_dalam_keluarga": "", "status_perkawinan": "", "#,
            r#""tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}"#
        );
        assert!(text.contains(expected_member), "got {}", text);
    }

    #[test]
    fn test_text_escaping_keeps_utf8() {
        let mut buf = Vec::new();
        encode_text(&mut buf, "gang \"mawar\"\\ é\n\u{1}");
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "\"gang \\\"mawar\\\"\\\\ é\\n\\u0001\""
        );
    }

    #[test]
    fn test_canonicalize_value_rejects_non_mapping() {
        assert!(matches!(
            canonicalize_value(&json!("3201")),
            Err(CoreError::InvalidRecord(_))
        ));
        let bytes = canonicalize_value(&json!({"nomor_kk": "3201"})).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains(r#""nomor_kk": "3201""#));
    }

    proptest::proptest! {
        #[test]
        fn test_text_escaping_agrees_with_json(s in "\\PC*|[\\x00-\\x1f\"\\\\]{0,8}") {
            let mut buf = Vec::new();
            encode_text(&mut buf, &s);
            proptest::prop_assert_eq!(String::from_utf8(buf).unwrap(), serde_json::to_string(&s).unwrap());
        }
    }
}
