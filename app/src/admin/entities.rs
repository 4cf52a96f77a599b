use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub Uuid);

/// The single admin identity. Created out of band by the `create_admin`
/// binary; never leaves the auth layer.
#[derive(Debug)]
pub struct Admin {
    pub id: Id,
    pub username: String,
    pub password_hash: String,
}
