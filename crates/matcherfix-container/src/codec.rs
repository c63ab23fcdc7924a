use crate::errors::ContainerError;
use crate::proto::AlertConfigDesc;
use matcherfix_canonical::ConfigDescriptor;
use prost::Message;

/// Encodes a descriptor as an `AlertConfigDesc` message.
///
/// Fields are written in tag order and empty strings are omitted, matching
/// other protobuf encoders byte for byte.
pub fn encode_descriptor(desc: &ConfigDescriptor) -> Vec<u8> {
    AlertConfigDesc::from(desc).encode_to_vec()
}

/// Decodes an `AlertConfigDesc` message.
///
/// Unknown fields are skipped. Empty input is a descriptor with every field
/// empty.
pub fn decode_descriptor(bytes: &[u8]) -> Result<ConfigDescriptor, ContainerError> {
    Ok(AlertConfigDesc::decode(bytes)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcherfix_canonical::TemplateDesc;

    fn sample() -> ConfigDescriptor {
        let mut desc = ConfigDescriptor::new("1", "a: b\n");
        desc.templates.push(TemplateDesc {
            filename: "t".into(),
            body: "x".into(),
        });
        desc
    }

    #[test]
    fn encodes_fields_in_tag_order() {
        let expected: &[u8] = &[
            0x0A, 0x01, b'1', // user
            0x12, 0x05, b'a', b':', b' ', b'b', b'\n', // raw_config
            0x1A, 0x06, 0x0A, 0x01, b't', 0x12, 0x01, b'x', // templates[0]
        ];
        assert_eq!(encode_descriptor(&sample()), expected);
        assert_eq!(decode_descriptor(expected).unwrap(), sample());
    }

    #[test]
    fn empty_fields_are_omitted() {
        assert!(encode_descriptor(&ConfigDescriptor::new("", "")).is_empty());
        assert_eq!(decode_descriptor(&[]).unwrap(), ConfigDescriptor::new("", ""));
    }

    #[test]
    fn truncated_bytes_fail() {
        let bytes = encode_descriptor(&sample());
        assert!(matches!(
            decode_descriptor(&bytes[..bytes.len() - 1]),
            Err(ContainerError::Decode(_))
        ));
    }
}
