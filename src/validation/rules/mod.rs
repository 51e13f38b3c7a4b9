pub(crate) mod pairing;
pub(crate) mod steady_state;
