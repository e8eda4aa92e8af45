pub mod authenticate;
pub mod signup;
