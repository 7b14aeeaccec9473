/// Represents an error in proof verification or proof patching.
#[derive(Fail, Clone, Debug, Eq, PartialEq)]
pub enum UtreexoError {
    /// This error occurs when a merkle proof is too short or too long,
    /// or does not lead to a node to which it should.
    #[fail(display = "Merkle proof is invalid")]
    InvalidProof,

    /// This error occurs when patching a proof whose item was deleted
    /// by the very update the proof is patched against.
    #[fail(display = "Item was deleted and its proof cannot be updated")]
    ItemDeleted,
}
