//! Faithful simulator for a family of historical rotor cipher machines:
//! the Enigma variants (Services, M3, M4, Abwehr, Railway, Tirpitz, KD),
//! the British Typex, the Swiss Nema, the US SIGABA, the KL7 and the
//! Schlüsselgerät 39.
//!
//! The crate models every machine as a stack of permutation carrying
//! rotors driven by a machine specific stepping gear, provides a
//! self-describing textual state format, state randomisation, and the
//! historical message procedures (transport encoding, indicator
//! derivation and message formatting).

pub mod config;
pub mod error;
pub mod formatter;
pub mod indicator;
pub mod machine;
pub mod permutation;
pub mod plugboard;
pub mod procedure;
pub mod randomize;
pub mod rotor;
pub mod rotordata;
pub mod rotorset;
pub mod state;
pub mod stepping;
pub mod transport;
pub mod utils;
