//! Specialization key serialization and name mangling (`spec.md` §4.6
//! "Key serialization").

use tsonic_ir::IrType;

/// Structural serialization used to deduplicate specialization requests.
/// Mirrors the recursive form the spec pins down exactly: primitives and
/// references serialize by name, arrays append `[]`, literals carry
/// their value, everything else falls back to its kind name.
pub fn serialize_type(ty: &IrType) -> String {
    match ty {
        IrType::Primitive { type_id, .. } => type_id.ts_name.clone(),
        IrType::Reference { type_id, type_arguments } => {
            if type_arguments.is_empty() {
                type_id.ts_name.clone()
            } else {
                let args: Vec<String> = type_arguments.iter().map(serialize_type).collect();
                format!("{}<{}>", type_id.ts_name, args.join(","))
            }
        }
        IrType::Array { element } => format!("{}[]", serialize_type(element)),
        IrType::Literal { value } => format!("literal:{value}"),
        IrType::TypeParameter { .. } => "TypeParameter".to_string(),
        IrType::Tuple { .. } => "Tuple".to_string(),
        IrType::Function { .. } => "Function".to_string(),
        IrType::Object { .. } => "Object".to_string(),
        IrType::Dictionary { .. } => "Dictionary".to_string(),
        IrType::Union { .. } => "Union".to_string(),
        IrType::Intersection { .. } => "Intersection".to_string(),
        IrType::Any => "Any".to_string(),
        IrType::Unknown => "Unknown".to_string(),
        IrType::Void => "Void".to_string(),
        IrType::Never => "Never".to_string(),
    }
}

/// Replaces every character that cannot appear in a CLR identifier with
/// an underscore.
fn sanitize(s: &str) -> String {
    s.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

/// `<base>__<arg1>__<arg2>…` (`spec.md` §4.6 "Generation").
pub fn specialized_name(base_name: &str, type_arguments: &[IrType]) -> String {
    let mut name = base_name.to_string();
    for arg in type_arguments {
        name.push_str("__");
        name.push_str(&sanitize(&serialize_type(arg)));
    }
    name
}

/// The deduplication key: base name plus every argument's serialized
/// form, joined so that two calls with the same concrete arguments
/// collapse to one request.
pub fn request_key(base_name: &str, type_arguments: &[IrType]) -> String {
    let args: Vec<String> = type_arguments.iter().map(serialize_type).collect();
    format!("{base_name}::{}", args.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_catalog::{StableId, TypeId};

    fn primitive(name: &str) -> IrType {
        IrType::Primitive { type_id: TypeId::new(StableId::source(name), name, name), numeric_intent: None }
    }

    #[test]
    fn identity_of_int_and_string_mangle_to_distinct_names() {
        assert_eq!(specialized_name("identity", &[primitive("int")]), "identity__int");
        assert_eq!(specialized_name("identity", &[primitive("string")]), "identity__string");
    }

    #[test]
    fn identical_type_arguments_serialize_to_the_same_key() {
        let a = request_key("identity", &[primitive("int")]);
        let b = request_key("identity", &[primitive("int")]);
        assert_eq!(a, b);
    }
}
