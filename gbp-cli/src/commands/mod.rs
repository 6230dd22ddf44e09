pub(crate) mod dump;
pub(crate) mod hash;
pub(crate) mod migrate;
pub(crate) mod seed;
pub(crate) mod serve;
