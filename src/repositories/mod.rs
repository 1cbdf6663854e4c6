pub(crate) mod health;
pub(crate) mod problems;
pub(crate) mod profiles;
pub(crate) mod submissions;
pub(crate) mod topics;
pub(crate) mod users;
