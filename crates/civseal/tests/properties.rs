//! Property tests over the verifier.

use civseal::store::MemoryLedger;
use civseal::{Config, Keypair, Outcome, Verifier};
use civseal_testkit::generators::{record, record_and_variant};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn verifier() -> Verifier<MemoryLedger> {
    Verifier::new(
        Config::new(Keypair::from_seed(&[0x21; 32]).unwrap()),
        MemoryLedger::new(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_presentation_of_an_ingested_record_is_valid(
        (original, presented) in record_and_variant()
    ) {
        let rt = Runtime::new().unwrap();
        let report = rt.block_on(async {
            let verifier = verifier();
            verifier.ingest(original).await.unwrap();
            verifier.verify_record(&presented).await.unwrap()
        });
        prop_assert_eq!(report.outcome, Outcome::Valid);
        prop_assert_eq!(report.version, Some(1));
    }

    #[test]
    fn a_changed_field_is_never_valid(r in record(3), extra in "[a-z]{1,6}") {
        let rt = Runtime::new().unwrap();
        let report = rt.block_on(async {
            let verifier = verifier();
            verifier.ingest(r.clone()).await.unwrap();

            let mut changed = r;
            changed.village = format!("{}{}", changed.village.trim(), extra);
            verifier.verify_record(&changed).await.unwrap()
        });
        prop_assert_eq!(report.outcome, Outcome::Tampered);
        prop_assert!(report.payload.is_none());
    }
}
