/// RFC 5114 2048-bit MODP group with 256-bit subgroup.
pub mod rfc5114;
