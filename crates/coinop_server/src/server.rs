pub(crate) mod endpoint;
pub(crate) mod hub;
pub(crate) mod relay;
pub(crate) mod safety_net;
