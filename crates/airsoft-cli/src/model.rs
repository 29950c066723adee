pub mod policy_model;
