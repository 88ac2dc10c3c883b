/// Binary writer for little-endian scenario data, used to build test inputs
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_zeros(&mut self, n: usize) {
        self.data.resize(self.data.len() + n, 0);
    }

    /// Write a section record: 4-byte tag, signed length, payload
    pub fn write_section(&mut self, tag: &[u8; 4], payload: &[u8]) {
        self.write_bytes(tag);
        self.write_i32_le(payload.len() as i32);
        self.write_bytes(payload);
    }

    /// Write a section header whose declared length differs from the payload that follows
    pub fn write_section_header(&mut self, tag: &[u8; 4], declared_len: i32) {
        self.write_bytes(tag);
        self.write_i32_le(declared_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::BinaryReader;

    #[test]
    fn test_roundtrip_primitives() {
        let mut writer = BinaryWriter::new();
        writer.write_u8(0x42);
        writer.write_u16_le(0x1234);
        writer.write_u32_le(0xDEADBEEF);

        let data = writer.into_vec();
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_write_section() {
        let mut writer = BinaryWriter::new();
        writer.write_section(b"ERA ", &[4, 0]);

        let data = writer.into_vec();
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_array::<4>().unwrap(), *b"ERA ");
        assert_eq!(reader.read_i32_le().unwrap(), 2);
        assert_eq!(reader.read_u16_le().unwrap(), 4);
    }
}
