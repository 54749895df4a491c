//! SQL type -> Java type mapping for generated fields.

/// Fallback for types without a dedicated mapping.
pub const FALLBACK_TYPE: &str = "java.io.Serializable";

fn normalized(sql_type: &str) -> String {
    let lower = sql_type.trim().to_lowercase();
    // Drop a size/precision suffix: "varchar(20)" -> "varchar".
    match lower.find('(') {
        Some(i) => lower[..i].trim().to_string(),
        None => lower,
    }
}

pub fn is_integral(sql_type: &str) -> bool {
    matches!(
        normalized(sql_type).as_str(),
        "int2" | "smallint" | "smallserial" | "int4" | "int" | "integer" | "serial" | "int8" | "bigint" | "bigserial"
    )
}

pub fn is_timestamp(sql_type: &str) -> bool {
    let n = normalized(sql_type);
    n == "timestamptz" || n.starts_with("timestamp")
}

/// Qualified Java type for a column. `boxed` selects wrapper types over primitives (nullable or key columns).
pub fn java_type(sql_type: &str, size: Option<i32>, boxed: bool) -> String {
    let n = normalized(sql_type);
    let primitive = match n.as_str() {
        "int2" | "smallint" | "smallserial" => Some("short"),
        "int4" | "int" | "integer" | "serial" => Some("int"),
        "int8" | "bigint" | "bigserial" => Some("long"),
        "bool" | "boolean" => Some("boolean"),
        "float4" | "real" => Some("float"),
        "float8" | "double precision" => Some("double"),
        "bpchar" | "char" | "character" if size == Some(1) => Some("char"),
        _ => None,
    };
    if let Some(p) = primitive {
        return if boxed { box_primitive(p).to_string() } else { p.to_string() };
    }
    let object = match n.as_str() {
        "numeric" | "decimal" | "money" => "java.math.BigDecimal",
        "bpchar" | "char" | "character" | "varchar" | "character varying" | "text" | "name" | "citext" => "String",
        "json" | "jsonb" | "xml" => "String",
        "date" | "time" | "timetz" | "time with time zone" | "time without time zone" => "java.util.Date",
        "bytea" => "byte[]",
        "uuid" => "java.util.UUID",
        other if other.starts_with("timestamp") => "java.util.Date",
        _ => FALLBACK_TYPE,
    };
    object.to_string()
}

fn box_primitive(p: &str) -> &'static str {
    match p {
        "short" => "Short",
        "int" => "Integer",
        "long" => "Long",
        "boolean" => "Boolean",
        "float" => "Float",
        "double" => "Double",
        "char" => "Character",
        _ => "Object",
    }
}

/// Simple name and optional import for a qualified type: "java.util.Date" -> ("Date", Some("java.util.Date")).
pub fn simple_name(qualified: &str) -> (String, Option<String>) {
    match qualified.rfind('.') {
        Some(i) if !qualified.starts_with("java.lang.") => {
            (qualified[i + 1..].to_string(), Some(qualified.to_string()))
        }
        Some(i) => (qualified[i + 1..].to_string(), None),
        None => (qualified.to_string(), None),
    }
}
