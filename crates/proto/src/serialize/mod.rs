//! Wire-format serialization. `binary` is the only format this core
//! speaks; the module exists as its own layer because `hickory-proto`
//! keeps serialization (bytes &lt;-&gt; types) separate from the `rr`/`op`
//! type definitions, and that separation carries over cleanly here.

pub mod binary;
