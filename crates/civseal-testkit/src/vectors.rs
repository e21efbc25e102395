//! Golden test vectors for the canonical encoding.
//!
//! Each vector pins the exact canonical bytes and BLAKE3 fingerprint of one
//! input, so any other implementation of the same canonical form can be
//! checked byte for byte.

use civseal_core::{canonical_bytes, fingerprint, CoreError, Record};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Short identifier for the vector.
    pub name: &'static str,
    pub description: &'static str,
    /// Extraction output as JSON text.
    pub input_json: &'static str,
    /// Expected canonical encoding (UTF-8).
    pub canonical: &'static str,
    /// Expected fingerprint, lowercase hex.
    pub fingerprint_hex: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty",
            description: "Empty object: every key present, no members",
            input_json: r#"{}"#,
            canonical: r#"{"alamat": "", "anggota_keluarga": [], "desa_kelurahan": "", "kabupaten_kota": "", "kecamatan": "", "kepala_keluarga": "", "kode_pos": "", "nomor_kk": "", "provinsi": "", "rt_rw": "", "tanggal_terbit": ""}"#,
            fingerprint_hex: "a64edddbdcc54025eaa2b8eb2f81d558b780456ee7b68211623b8f2f07fa56d9",
        },
        GoldenVector {
            name: "household",
            description: "Two-member household in extraction case, members out of NIK order",
            input_json: r#"{"nomor_kk": "3201010101010001", "kepala_keluarga": "BUDI SANTOSO", "alamat": "JL. MERDEKA NO. 1", "rt_rw": "001/002", "kode_pos": "16110", "desa_kelurahan": "SUKAMAJU", "kecamatan": "CIBINONG", "kabupaten_kota": "KABUPATEN BOGOR", "provinsi": "JAWA BARAT", "tanggal_terbit": "14-01-2026", "anggota_keluarga": [{"nama": "SITI AMINAH", "nik": "3201014101850002", "jenis_kelamin": "PEREMPUAN", "tempat_lahir": "BOGOR", "tanggal_lahir": "01-01-1985", "agama": "ISLAM", "pendidikan": "SLTA/SEDERAJAT", "pekerjaan": "MENGURUS RUMAH TANGGA", "golongan_darah": "O", "status_perkawinan": "KAWIN", "tanggal_perkawinan": "12-06-2008", "status_dalam_keluarga": "ISTRI", "kewarganegaraan": "WNI", "ayah": "AHMAD", "ibu": "FATIMAH"}, {"nama": "BUDI SANTOSO", "nik": "3201010101800001", "jenis_kelamin": "LAKI-LAKI", "tempat_lahir": "JAKARTA", "tanggal_lahir": "01-01-1980", "agama": "ISLAM", "pendidikan": "DIPLOMA IV/STRATA I", "pekerjaan": "KARYAWAN SWASTA", "golongan_darah": "A", "status_perkawinan": "KAWIN", "tanggal_perkawinan": "12-06-2008", "status_dalam_keluarga": "KEPALA KELUARGA", "kewarganegaraan": "WNI", "ayah": "SANTOSO", "ibu": "SRI"}]}"#,
            canonical: r#"{"alamat": "jl. merdeka no. 1", "anggota_keluarga": [{"agama": "islam", "ayah": "santoso", "golongan_darah": "a", "ibu": "sri", "jenis_kelamin": "laki-laki", "kewarganegaraan": "wni", "nama": "budi santoso", "nik": "3201010101800001", "pekerjaan": "karyawan swasta", "pendidikan": "diploma iv/strata i", "status_dalam_keluarga": "kepala keluarga", "status_perkawinan": "kawin", "tanggal_lahir": "01-01-1980", "tanggal_perkawinan": "12-06-2008", "tempat_lahir": "jakarta"}, {"agama": "islam", "ayah": "ahmad", "golongan_darah": "o", "ibu": "fatimah", "jenis_kelamin": "perempuan", "kewarganegaraan": "wni", "nama": "siti aminah", "nik": "3201014101850002", "pekerjaan": "mengurus rumah tangga", "pendidikan": "slta/sederajat", "status_dalam_keluarga": "istri", "status_perkawinan": "kawin", "tanggal_lahir": "01-01-1985", "tanggal_perkawinan": "12-06-2008", "tempat_lahir": "bogor"}], "desa_kelurahan": "sukamaju", "kabupaten_kota": "kabupaten bogor", "kecamatan": "cibinong", "kepala_keluarga": "budi santoso", "kode_pos": "16110", "nomor_kk": "3201010101010001", "provinsi": "jawa barat", "rt_rw": "001/002", "tanggal_terbit": "14-01-2026"}"#,
            fingerprint_hex: "66a066204a28c93771c52bc21077365ab0ca2fdc5446ef0433416e98382b992e",
        },
        GoldenVector {
            name: "unicode_and_escapes",
            description: "Padded identifier, non-ASCII letters, quotes, backslash, newline",
            input_json: r#"{"nomor_kk": " 7271010101010003 ", "kepala_keluarga": "  José \"Joe\" Ñúñez\t", "alamat": "Gg. Mawar\\Melati\nBlok C", "anggota_keluarga": [{"nama": "ÉLODIE", "nik": "2"}, {"nama": "Ömer", "nik": "1"}]}"#,
            canonical: r#"{"alamat": "gg. mawar\\melati\nblok c", "anggota_keluarga": [{"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "jenis_kelamin": "", "kewarganegaraan": "", "nama": "ömer", "nik": "1", "pekerjaan": "", "pendidikan": "", "status_dalam_keluarga": "", "status_perkawinan": "", "tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}, {"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "jenis_kelamin": "", "kewarganegaraan": "", "nama": "élodie", "nik": "2", "pekerjaan": "", "pendidikan": "", "status_dalam_keluarga": "", "status_perkawinan": "", "tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}], "desa_kelurahan": "", "kabupaten_kota": "", "kecamatan": "", "kepala_keluarga": "josé \"joe\" ñúñez", "kode_pos": "", "nomor_kk": "7271010101010003", "provinsi": "", "rt_rw": "", "tanggal_terbit": ""}"#,
            fingerprint_hex: "327679edc198ff9df5f7197064e3a96afa49845020fe8179e7333a30f854636a",
        },
        GoldenVector {
            name: "loose_scalars",
            description: "Numbers and booleans where text is expected; NIKs sort as text",
            input_json: r#"{"nomor_kk": 3201010101010004, "kode_pos": 16110, "kepala_keluarga": true, "anggota_keluarga": [{"nik": 10, "nama": "A"}, {"nik": 9, "nama": "B"}]}"#,
            canonical: r#"{"alamat": "", "anggota_keluarga": [{"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "jenis_kelamin": "", "kewarganegaraan": "", "nama": "a", "nik": "10", "pekerjaan": "", "pendidikan": "", "status_dalam_keluarga": "", "status_perkawinan": "", "tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}, {"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "jenis_kelamin": "", "kewarganegaraan": "", "nama": "b", "nik": "9", "pekerjaan": "", "pendidikan": "", "status_dalam_keluarga": "", "status_perkawinan": "", "tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}], "desa_kelurahan": "", "kabupaten_kota": "", "kecamatan": "", "kepala_keluarga": "true", "kode_pos": "16110", "nomor_kk": "3201010101010004", "provinsi": "", "rt_rw": "", "tanggal_terbit": ""}"#,
            fingerprint_hex: "6bb140354d843c85a31386f6e836f738736194892ad3fd4cd89bfc35cd6543ac",
        },
        GoldenVector {
            name: "null_fields",
            description: "Null values encode as empty text, same as absent keys",
            input_json: r#"{"nomor_kk": "3201010101010005", "kepala_keluarga": "RINA", "alamat": null, "kode_pos": null, "anggota_keluarga": [{"nama": "RINA", "nik": "3201015505900001", "golongan_darah": null, "ibu": null}]}"#,
            canonical: r#"{"alamat": "", "anggota_keluarga": [{"agama": "", "ayah": "", "golongan_darah": "", "ibu": "", "jenis_kelamin": "", "kewarganegaraan": "", "nama": "rina", "nik": "3201015505900001", "pekerjaan": "", "pendidikan": "", "status_dalam_keluarga": "", "status_perkawinan": "", "tanggal_lahir": "", "tanggal_perkawinan": "", "tempat_lahir": ""}], "desa_kelurahan": "", "kabupaten_kota": "", "kecamatan": "", "kepala_keluarga": "rina", "kode_pos": "", "nomor_kk": "3201010101010005", "provinsi": "", "rt_rw": "", "tanggal_terbit": ""}"#,
            fingerprint_hex: "4bda7d6be6b065fd5933760dd1c1dee1da9b62dc9af2ecb813bc9a485582dc41",
        },
    ]
}

/// Parse the input of a vector.
pub fn record_from_vector(vector: &GoldenVector) -> Result<Record, CoreError> {
    Record::from_json(vector.input_json)
}

/// Check every vector; returns the names of those that fail.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| match record_from_vector(v) {
            Ok(record) => {
                canonical_bytes(&record) != v.canonical.as_bytes()
                    || fingerprint(&record).to_hex() != v.fingerprint_hex
            }
            Err(_) => true,
        })
        .map(|v| v.name)
        .collect()
}
