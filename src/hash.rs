use core::fmt;
use merlin::Transcript;

/// Hash of a leaf or an inner node in the forest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub [u8; 32]);

/// Combiner of two child hashes into the hash of their parent node.
/// The forest treats the combiner as opaque: it only needs to be
/// deterministic and collision-resistant.
pub trait NodeHasher: Clone {
    /// Computes the hash of an inner node from the hashes of its
    /// left and right children.
    fn intermediate(&self, left: &Hash, right: &Hash) -> Hash;
}

/// Node hasher based on a Merlin transcript with a caller-chosen
/// domain-separation label.
#[derive(Clone)]
pub struct TranscriptHasher {
    t: Transcript,
}

impl TranscriptHasher {
    /// Creates a hasher instance with a domain-separation label.
    pub fn new(label: &'static [u8]) -> Self {
        TranscriptHasher {
            t: Transcript::new(label),
        }
    }
}

impl NodeHasher for TranscriptHasher {
    fn intermediate(&self, left: &Hash, right: &Hash) -> Hash {
        let mut t = self.t.clone();
        t.append_message(b"L", &left);
        t.append_message(b"R", &right);
        let mut hash = Hash::default();
        t.challenge_bytes(b"merkle.node", &mut hash);
        hash
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::ops::Deref for Hash {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for Hash {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl serde::Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BytesVisitor;

        impl<'de> serde::de::Visitor<'de> for BytesVisitor {
            type Value = Hash;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid 32-byte string")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Hash, E>
            where
                E: serde::de::Error,
            {
                if v.len() == 32 {
                    let mut buf = [0u8; 32];
                    buf[0..32].copy_from_slice(v);
                    Ok(Hash(buf))
                } else {
                    Err(serde::de::Error::invalid_length(v.len(), &self))
                }
            }

            // Human-readable formats represent byte strings as sequences.
            fn visit_seq<A>(self, mut seq: A) -> Result<Hash, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut buf = [0u8; 32];
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                if seq.next_element::<u8>()?.is_some() {
                    return Err(serde::de::Error::invalid_length(33, &self));
                }
                Ok(Hash(buf))
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}
