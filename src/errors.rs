use std::fmt;

error_chain! {
    errors {
        /// A texture file could not be read or is not a Nitro TGA we understand.
        Resource(path: String, msg: String) {
            description("bad texture resource")
            display("texture {}: {}", path, msg)
        }

        /// Rejected export options or scene settings. Raised before any file
        /// is written.
        Configuration(msg: String) {
            description("invalid configuration")
            display("invalid configuration: {}", msg)
        }

        /// A vertex coordinate doesn't fit in 16 bits even after applying
        /// the model's pos_scale.
        Overflow(object: String, value: i64) {
            description("vertex coordinate out of range")
            display("vertex coordinate {:#x} in object {} doesn't fit in 16 bits after pos_scale",
                value, object)
        }

        /// The scene snapshot is structurally invalid.
        Scene(msg: String) {
            description("malformed scene")
            display("malformed scene: {}", msg)
        }
    }

    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error);
        Json(::json::Error);
        Time(::time::ParseError);
    }
}

macro_rules! check {
    ($b:expr) => {
        if !$b {
            use errors::Error;
            use errors::ErrorKind;
            Err(Error::from_kind(ErrorKind::Msg(format!(
                "expected: {}",
                stringify!($b)
            ))))
        } else {
            Ok(())
        }
    };
}

/// Something in the scene that was skipped or exported approximately. These
/// don't stop the export; they're logged and handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub object: String,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Face with more than four corners.
    Ngon,
    /// Face with fewer than three corners.
    Line,
    /// Face whose material slot is empty or out of range.
    NoMaterial,
    /// Face referencing a vertex index that doesn't exist.
    BadVertexIndex,
    /// Face whose corners are in different vertex groups. It is still
    /// exported, bound to the group of its first corner.
    MixedGroups,
}

impl DiagnosticKind {
    /// Whether the face was left out of the model.
    pub fn skipped(self) -> bool {
        self != DiagnosticKind::MixedGroups
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let what = match self.kind {
            DiagnosticKind::Ngon => "polygon is an ngon",
            DiagnosticKind::Line => "polygon is a line",
            DiagnosticKind::NoMaterial => "polygon doesn't have a material",
            DiagnosticKind::BadVertexIndex => "polygon references a missing vertex",
            DiagnosticKind::MixedGroups => {
                return write!(f, "{}: polygon spans several vertex groups. \
                    Bound to the group of its first corner.", self.object);
            }
        };
        write!(f, "{}: {}. Skipped.", self.object, what)
    }
}
