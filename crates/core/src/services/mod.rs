pub mod xref;
