//! One module per subcommand.  Each exposes an `execute` function.

pub mod completions;
pub mod decrypt;
pub mod derive;
pub mod ecdh;
pub mod encrypt;
pub mod hash;
pub mod keygen;
pub mod random;
pub mod self_test;
