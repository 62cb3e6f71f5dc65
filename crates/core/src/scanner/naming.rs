//! Java-side name derivation for types without an explicit JNI name.

/// Derives the JNI name from a CLR full name: dots become slashes, nested
/// type separators ('+') become JVM inner-class separators ('$'), and the
/// generic arity marker is mangled so "Adapter`1" yields one peer name
/// regardless of instantiation.
pub(crate) fn fallback_java_name(full_name: &str) -> String {
    let (ns, type_part) = split_namespace(full_name);
    let type_part = mangle_type_part(type_part);
    if ns.is_empty() {
        type_part
    } else {
        format!("{}/{}", ns.replace('.', "/"), type_part)
    }
}

/// The legacy compatibility name: the lowercased namespace path plus the
/// unlowered type name. Everything downstream treats this as an opaque,
/// stable string.
pub(crate) fn compat_java_name(full_name: &str) -> String {
    let (ns, type_part) = split_namespace(full_name);
    let type_part = mangle_type_part(type_part);
    if ns.is_empty() {
        type_part
    } else {
        format!("{}/{}", ns.to_lowercase().replace('.', "/"), type_part)
    }
}

/// Converts a component attribute's dotted `Name` property to JNI form.
pub(crate) fn dots_to_slashes(name: &str) -> String {
    name.replace('.', "/")
}

fn mangle_type_part(type_part: &str) -> String {
    type_part.replace('+', "$").replace('`', "_")
}

/// Splits "Ns.Sub.Outer+Inner" into ("Ns.Sub", "Outer+Inner"). The last dot
/// is the namespace boundary; dots never appear inside a nested type part.
fn split_namespace(full_name: &str) -> (&str, &str) {
    match full_name.rsplit_once('.') {
        Some((ns, tail)) => (ns, tail),
        None => ("", full_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_type_converts_dots() {
        assert_eq!(fallback_java_name("MyApp.MainActivity"), "MyApp/MainActivity");
    }

    #[test]
    fn nested_type_uses_inner_class_separator() {
        assert_eq!(
            fallback_java_name("MyApp.Outer+Inner"),
            "MyApp/Outer$Inner"
        );
    }

    #[test]
    fn generic_definition_mangles_arity_marker() {
        assert_eq!(
            fallback_java_name("MyApp.Adapter`1"),
            "MyApp/Adapter_1"
        );
    }

    #[test]
    fn namespaceless_type() {
        assert_eq!(fallback_java_name("Standalone"), "Standalone");
        assert_eq!(compat_java_name("Standalone"), "Standalone");
    }

    #[test]
    fn compat_name_lowercases_namespace_only() {
        assert_eq!(
            compat_java_name("MyApp.Views.CustomView"),
            "myapp/views/CustomView"
        );
    }
}
