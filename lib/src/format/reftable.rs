use crate::{
    error::{GbxError, Result},
    util::cursor::{Reader, Writer},
};

/// External node reference table.
///
/// Only the empty table is supported: references to nodes in other files are
/// rejected when reading.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefTable {
    pub external_node_count: u32,
}

impl RefTable {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        let count = reader.read_u32()?;
        log::debug!("external node count {}", count);
        if count != 0 {
            return Err(GbxError::UnsupportedExternalReferences { count });
        }
        Ok(Self { external_node_count: count })
    }

    pub fn write(&self, writer: &mut Writer) { writer.write_u32(self.external_node_count); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table() {
        let mut reader = Reader::new(&[0, 0, 0, 0, 0xAB]);
        assert_eq!(RefTable::read(&mut reader).unwrap().external_node_count, 0);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn external_references_are_rejected() {
        let mut reader = Reader::new(&[2, 0, 0, 0, 1, 0, 0, 0]);
        assert!(matches!(
            RefTable::read(&mut reader),
            Err(GbxError::UnsupportedExternalReferences { count: 2 })
        ));
        assert_eq!(reader.position(), 4);
    }
}
