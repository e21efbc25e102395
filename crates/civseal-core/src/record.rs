//! The record model: a household registration document and its members.
//!
//! Field names are English in Rust; the serialized keys are the ones the
//! extraction collaborator produces, and they are also the keys of the
//! canonical encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DocumentId;

/// Serialized keys.
pub mod keys {
    pub const FAMILY_NUMBER: &str = "nomor_kk";
    pub const HEAD_OF_FAMILY: &str = "kepala_keluarga";
    pub const ADDRESS: &str = "alamat";
    pub const RT_RW: &str = "rt_rw";
    pub const POSTAL_CODE: &str = "kode_pos";
    pub const VILLAGE: &str = "desa_kelurahan";
    pub const DISTRICT: &str = "kecamatan";
    pub const REGENCY: &str = "kabupaten_kota";
    pub const PROVINCE: &str = "provinsi";
    pub const ISSUED_ON: &str = "tanggal_terbit";
    pub const MEMBERS: &str = "anggota_keluarga";

    pub mod member {
        pub const NAME: &str = "nama";
        pub const NIK: &str = "nik";
        pub const SEX: &str = "jenis_kelamin";
        pub const BIRTH_PLACE: &str = "tempat_lahir";
        pub const BIRTH_DATE: &str = "tanggal_lahir";
        pub const RELIGION: &str = "agama";
        pub const EDUCATION: &str = "pendidikan";
        pub const OCCUPATION: &str = "pekerjaan";
        pub const BLOOD_TYPE: &str = "golongan_darah";
        pub const MARITAL_STATUS: &str = "status_perkawinan";
        pub const MARRIAGE_DATE: &str = "tanggal_perkawinan";
        pub const RELATIONSHIP: &str = "status_dalam_keluarga";
        pub const CITIZENSHIP: &str = "kewarganegaraan";
        pub const FATHER: &str = "ayah";
        pub const MOTHER: &str = "ibu";
    }
}

/// Number of scalar fields on a [`Record`].
pub const RECORD_FIELD_COUNT: usize = 10;

/// Number of scalar fields on a [`Member`].
pub const MEMBER_FIELD_COUNT: usize = 15;

/// A household registration record.
///
/// Records are plain values; two records are equivalent when their
/// canonical encodings are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "nomor_kk")]
    pub family_number: String,
    #[serde(rename = "kepala_keluarga")]
    pub head_of_family: String,
    #[serde(rename = "alamat")]
    pub address: String,
    #[serde(rename = "rt_rw")]
    pub rt_rw: String,
    #[serde(rename = "kode_pos")]
    pub postal_code: String,
    #[serde(rename = "desa_kelurahan")]
    pub village: String,
    #[serde(rename = "kecamatan")]
    pub district: String,
    #[serde(rename = "kabupaten_kota")]
    pub regency: String,
    #[serde(rename = "provinsi")]
    pub province: String,
    #[serde(rename = "tanggal_terbit")]
    pub issued_on: String,
    #[serde(rename = "anggota_keluarga")]
    pub members: Vec<Member>,
}

/// One person listed on a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    #[serde(rename = "nama")]
    pub name: String,
    /// National identity number, unique within a record.
    #[serde(rename = "nik")]
    pub nik: String,
    #[serde(rename = "jenis_kelamin")]
    pub sex: String,
    #[serde(rename = "tempat_lahir")]
    pub birth_place: String,
    #[serde(rename = "tanggal_lahir")]
    pub birth_date: String,
    #[serde(rename = "agama")]
    pub religion: String,
    #[serde(rename = "pendidikan")]
    pub education: String,
    #[serde(rename = "pekerjaan")]
    pub occupation: String,
    #[serde(rename = "golongan_darah")]
    pub blood_type: String,
    #[serde(rename = "status_perkawinan")]
    pub marital_status: String,
    #[serde(rename = "tanggal_perkawinan")]
    pub marriage_date: String,
    #[serde(rename = "status_dalam_keluarga")]
    pub relationship: String,
    #[serde(rename = "kewarganegaraan")]
    pub citizenship: String,
    #[serde(rename = "ayah")]
    pub father: String,
    #[serde(rename = "ibu")]
    pub mother: String,
}

impl Record {
    /// Build a record from loosely-typed extraction output.
    ///
    /// Missing keys and `null` values become empty strings; numbers and
    /// booleans keep their JSON text. Anything that is not an object, or a
    /// member list that is not an array of objects, is rejected.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let map = value
            .as_object()
            .ok_or_else(|| CoreError::InvalidRecord("expected an object".into()))?;

        let mut record = Record::default();
        for (key, slot) in record.fields_mut() {
            *slot = scalar_text(map, key)?;
        }

        record.members = match map.get(keys::MEMBERS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Member::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(CoreError::InvalidRecord(format!(
                    "{} must be an array",
                    keys::MEMBERS
                )))
            }
        };

        Ok(record)
    }

    /// Parse a record from JSON text.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidRecord(e.to_string()))?;
        Self::from_value(&value)
    }

    /// The document identifier carried in the record itself.
    pub fn document_id(&self) -> Result<DocumentId, CoreError> {
        DocumentId::new(&self.family_number)
    }

    /// Scalar fields paired with their serialized keys.
    pub fn fields(&self) -> [(&'static str, &str); RECORD_FIELD_COUNT] {
        [
            (keys::FAMILY_NUMBER, self.family_number.as_str()),
            (keys::HEAD_OF_FAMILY, self.head_of_family.as_str()),
            (keys::ADDRESS, self.address.as_str()),
            (keys::RT_RW, self.rt_rw.as_str()),
            (keys::POSTAL_CODE, self.postal_code.as_str()),
            (keys::VILLAGE, self.village.as_str()),
            (keys::DISTRICT, self.district.as_str()),
            (keys::REGENCY, self.regency.as_str()),
            (keys::PROVINCE, self.province.as_str()),
            (keys::ISSUED_ON, self.issued_on.as_str()),
        ]
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut String); RECORD_FIELD_COUNT] {
        [
            (keys::FAMILY_NUMBER, &mut self.family_number),
            (keys::HEAD_OF_FAMILY, &mut self.head_of_family),
            (keys::ADDRESS, &mut self.address),
            (keys::RT_RW, &mut self.rt_rw),
            (keys::POSTAL_CODE, &mut self.postal_code),
            (keys::VILLAGE, &mut self.village),
            (keys::DISTRICT, &mut self.district),
            (keys::REGENCY, &mut self.regency),
            (keys::PROVINCE, &mut self.province),
            (keys::ISSUED_ON, &mut self.issued_on),
        ]
    }

    /// Return the normalized form: every scalar trimmed and lowercased,
    /// members sorted by their normalized NIK.
    pub fn normalized(&self) -> Record {
        let mut out = self.clone();
        for (_, slot) in out.fields_mut() {
            *slot = normalize(slot);
        }
        out.members = self.members.iter().map(Member::normalized).collect();
        // Stable sort: members sharing a NIK keep their relative order.
        out.members.sort_by(|a, b| a.nik.cmp(&b.nik));
        out
    }
}

impl Member {
    /// Build a member from loosely-typed extraction output.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let map = value.as_object().ok_or_else(|| {
            CoreError::InvalidRecord(format!("{} entries must be objects", keys::MEMBERS))
        })?;

        let mut member = Member::default();
        for (key, slot) in member.fields_mut() {
            *slot = scalar_text(map, key)?;
        }
        Ok(member)
    }

    /// Scalar fields paired with their serialized keys.
    pub fn fields(&self) -> [(&'static str, &str); MEMBER_FIELD_COUNT] {
        use keys::member as k;
        [
            (k::NAME, self.name.as_str()),
            (k::NIK, self.nik.as_str()),
            (k::SEX, self.sex.as_str()),
            (k::BIRTH_PLACE, self.birth_place.as_str()),
            (k::BIRTH_DATE, self.birth_date.as_str()),
            (k::RELIGION, self.religion.as_str()),
            (k::EDUCATION, self.education.as_str()),
            (k::OCCUPATION, self.occupation.as_str()),
            (k::BLOOD_TYPE, self.blood_type.as_str()),
            (k::MARITAL_STATUS, self.marital_status.as_str()),
            (k::MARRIAGE_DATE, self.marriage_date.as_str()),
            (k::RELATIONSHIP, self.relationship.as_str()),
            (k::CITIZENSHIP, self.citizenship.as_str()),
            (k::FATHER, self.father.as_str()),
            (k::MOTHER, self.mother.as_str()),
        ]
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut String); MEMBER_FIELD_COUNT] {
        use keys::member as k;
        [
            (k::NAME, &mut self.name),
            (k::NIK, &mut self.nik),
            (k::SEX, &mut self.sex),
            (k::BIRTH_PLACE, &mut self.birth_place),
            (k::BIRTH_DATE, &mut self.birth_date),
            (k::RELIGION, &mut self.religion),
            (k::EDUCATION, &mut self.education),
            (k::OCCUPATION, &mut self.occupation),
            (k::BLOOD_TYPE, &mut self.blood_type),
            (k::MARITAL_STATUS, &mut self.marital_status),
            (k::MARRIAGE_DATE, &mut self.marriage_date),
            (k::RELATIONSHIP, &mut self.relationship),
            (k::CITIZENSHIP, &mut self.citizenship),
            (k::FATHER, &mut self.father),
            (k::MOTHER, &mut self.mother),
        ]
    }

    /// Return the member with every scalar trimmed and lowercased.
    pub fn normalized(&self) -> Member {
        let mut out = self.clone();
        for (_, slot) in out.fields_mut() {
            *slot = normalize(slot);
        }
        out
    }
}

/// Trim surrounding whitespace and fold to lowercase.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn scalar_text(map: &Map<String, Value>, key: &str) -> Result<String, CoreError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(CoreError::InvalidRecord(format!(
            "field {} must be a scalar",
            key
        ))),
    }
}
