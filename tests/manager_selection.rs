//! `CryptoManager` suite negotiation picks the highest-priority name both
//! sides advertise (spec testable property 7: priorities `RSA = 1`,
//! `GoldwasserMicali = 3`).

use securechan::config::{PkcConfig, SuiteBuilder, SymmetricConfig};

#[test]
fn choose_algorithms_prefers_the_higher_priority_pkc() {
    let mut builder = SuiteBuilder::new();
    builder.add_rc4(SymmetricConfig { key_size: 56 });
    builder
        .add_rsa(PkcConfig {
            key_size: 64,
            pub_key: None,
            priv_key: None,
        })
        .unwrap();
    builder
        .add_goldwasser_micali(PkcConfig {
            key_size: 64,
            pub_key: None,
            priv_key: None,
        })
        .unwrap();
    let mut manager = builder.build();

    let offered_pkc = manager.supported_pkcs();
    let offered_symmetric = manager.supported_symmetric();
    assert!(manager.choose_algorithms(&offered_pkc, &offered_symmetric));

    let (public, _) = manager.get_pkc();
    assert!(public.unwrap().name().starts_with("GoldwasserMicali_"));
}
