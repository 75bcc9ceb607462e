use serde::Serialize;

use njast_syntax::TypeDeclKind;

/// How an evaluated type was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeOrigin {
    /// A method's declared return type.
    Method,
    /// A value of the type.
    Object,
    /// A static reference to the type itself.
    Class,
    /// The type context of a class body.
    Body,
    /// An anonymous class body; the type is the one being instantiated.
    Anonymous,
}

/// The outcome of evaluating a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedType {
    /// Qualified type name, a primitive, `void` or `null`.
    #[serde(rename = "type")]
    pub ty: String,
    pub from: TypeOrigin,
    /// Array dimensions.
    pub array: u32,
}

impl ResolvedType {
    pub fn new(ty: impl Into<String>, from: TypeOrigin) -> Self {
        Self {
            ty: ty.into(),
            from,
            array: 0,
        }
    }

    pub fn object(ty: impl Into<String>) -> Self {
        Self::new(ty, TypeOrigin::Object)
    }

    pub fn with_array(mut self, array: u32) -> Self {
        self.array = array;
        self
    }

    pub fn with_origin(mut self, from: TypeOrigin) -> Self {
        self.from = from;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array > 0
    }
}

/// What to extract from a class with
/// [`ClassResolver::open_class`](crate::ClassResolver::open_class).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Every member of the selected kinds declared directly in the type.
    Members { methods: bool, fields: bool },
    /// The named method, searching the type hierarchy.
    Method(String),
    /// The named field, searching the type hierarchy.
    Field(String),
}

impl Projection {
    pub fn all() -> Self {
        Projection::Members {
            methods: true,
            fields: true,
        }
    }

    /// General projections describe one type; specific ones may answer
    /// from a supertype.
    pub fn is_general(&self) -> bool {
        matches!(self, Projection::Members { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProjection {
    pub name: String,
    pub kind: MemberKind,
    /// Field type or method return type.
    #[serde(rename = "type")]
    pub ty: String,
    pub array: u32,
    /// The type that declares the member.
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<String>,
    pub is_static: bool,
}

impl MemberProjection {
    /// The member's type as seen through an access expression.
    pub fn resolved(&self) -> ResolvedType {
        let from = match self.kind {
            MemberKind::Method => TypeOrigin::Method,
            MemberKind::Field => TypeOrigin::Object,
        };
        ResolvedType::new(self.ty.clone(), from).with_array(self.array)
    }
}

/// A resolver-independent description of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassProjection {
    pub qualified_name: String,
    pub kind: TypeDeclKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MemberProjection>,
    pub fields: Vec<MemberProjection>,
}

impl ClassProjection {
    /// The single member a specific projection was answered with.
    pub fn member(&self) -> Option<&MemberProjection> {
        self.methods.first().or_else(|| self.fields.first())
    }
}
