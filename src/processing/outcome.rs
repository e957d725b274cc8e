use std::fmt;

/// A business outcome that leaves the run going: nobody was recognised,
/// or the service returned something other than what was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    NoFaceDetected { image: String },
    MultipleFacesDetected { image: String, count: usize },
    NoFaceMatch { image: String, face_id: String },
    NoIdentityForFace { image: String, face_id: String },
    AssociationRejected { user_id: String, face_id: String, reasons: Vec<String> },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoFaceDetected { image } => write!(f, "No face found in image {}", image),
            Warning::MultipleFacesDetected { image, count } => write!(
                f,
                "More than one face found in image {} ({} faces, using the first)",
                image, count
            ),
            Warning::NoFaceMatch { image, face_id } => {
                write!(f, "No match found for face {} (image: {})", face_id, image)
            }
            Warning::NoIdentityForFace { image, face_id } => write!(
                f,
                "No user found for faceId {} (image: {}), the matched face belongs to the collection",
                face_id, image
            ),
            Warning::AssociationRejected { user_id, face_id, reasons } => write!(
                f,
                "Face {} was not associated to user {}: {}",
                face_id,
                user_id,
                reasons.join(", ")
            ),
        }
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Warning(Warning),
    Fatal(anyhow::Error),
}

impl<T> Outcome<T> {
    /// Collapses the result of a fallible step that may itself yield a warning.
    pub fn flatten(result: anyhow::Result<Outcome<T>>) -> Outcome<T> {
        match result {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Fatal(e),
        }
    }

    /// Moves the warning into `warnings` and turns `Fatal` into an error,
    /// leaving only the successful value.
    pub fn into_result(self, warnings: &mut Vec<Warning>) -> anyhow::Result<Option<T>> {
        match self {
            Outcome::Ok(value) => Ok(Some(value)),
            Outcome::Warning(warning) => {
                record(warnings, warning);
                Ok(None)
            }
            Outcome::Fatal(e) => Err(e),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Outcome::Warning(_))
    }
}

pub fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}
