//! Integration tests — full scenarios through the ledger core and the
//! JSON API.

mod api;
