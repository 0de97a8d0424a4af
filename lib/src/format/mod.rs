pub mod body;
pub mod challenge;
pub mod chunk;
pub mod gbx;
pub mod header;
pub mod reftable;

use std::io::Write;

use crate::format::gbx::GbxDocument;

/// Dump a document's sections and chunk tables.
pub fn dump_gbx<W: Write>(w: &mut W, doc: &GbxDocument) -> anyhow::Result<()> {
    let header = &doc.header;
    writeln!(w, "GBX version {}", header.version)?;
    if let Some(flags) = &header.flags {
        writeln!(
            w,
            "  Format: {:?}, ref table: {:?}, body: {:?}",
            flags.byte_format, flags.ref_table_compression, flags.body_compression
        )?;
    }
    if let Some(class_id) = header.class_id {
        writeln!(w, "  Class ID: {class_id:#010X}")?;
    }
    if let Some(user_data) = &header.user_data {
        writeln!(w, "  User data: {} bytes", user_data.declared_size)?;
        for chunk in &user_data.chunks {
            writeln!(w, "  - {chunk:?}")?;
        }
    }
    writeln!(w, "  Nodes: {}", header.node_count)?;
    writeln!(w, "  External nodes: {}", doc.ref_table.external_node_count)?;
    match doc.body.sizes() {
        Some(sizes) => writeln!(
            w,
            "Body: {} bytes ({} compressed)",
            sizes.decompressed, sizes.compressed
        )?,
        None => writeln!(w, "Body: {} bytes", doc.body.data().len())?,
    }
    match doc.body_chunks() {
        Ok(chunks) => {
            for chunk in chunks {
                writeln!(w, "  - {chunk:?}")?;
            }
        }
        Err(e) => writeln!(w, "  (body does not frame into chunks: {e})")?,
    }
    Ok(())
}
