//! Input definition resolution and configuration validation

use crate::schema::{
    split_header, DefaultsRecord, InputSpec, MergeSpec, MysqlSource, PipelineConfig, SourceSpec,
    DEFAULT_ETCD_DIR, DEFAULT_ETCD_PORT, DEFAULT_HTTP_FORMAT, DEFAULT_HTTP_HEADER,
    DEFAULT_MYSQL_PORT,
};
use std::path::PathBuf;
use types::{ResolveError, Secret, ValidationError, Value};

/// Field values for one input after defaults and overrides are applied
#[derive(Debug, Default)]
struct Fields {
    name: Option<String>,
    kind: Option<String>,
    path: Option<String>,
    etcd_node: Option<String>,
    etcd_port: Option<u16>,
    etcd_dir: Option<String>,
    http_url: Option<String>,
    http_header: Option<String>,
    http_format: Option<String>,
    mysql_user: Option<String>,
    mysql_pass: Option<Secret>,
    mysql_host: Option<String>,
    mysql_port: Option<u16>,
    mysql_db: Option<String>,
    mysql_qry: Option<String>,
}

impl Fields {
    /// Built-in defaults, then the `[defaults]` record on top
    fn seeded(defaults: &DefaultsRecord) -> Self {
        Self {
            etcd_node: defaults.etcd_node.clone(),
            etcd_port: defaults.etcd_port.or(Some(DEFAULT_ETCD_PORT)),
            http_header: defaults
                .http_header
                .clone()
                .or_else(|| Some(DEFAULT_HTTP_HEADER.to_string())),
            http_format: defaults
                .http_format
                .clone()
                .or_else(|| Some(DEFAULT_HTTP_FORMAT.to_string())),
            mysql_user: defaults.mysql_user.clone(),
            mysql_pass: defaults.mysql_pass.clone(),
            mysql_host: defaults.mysql_host.clone(),
            mysql_port: defaults.mysql_port.or(Some(DEFAULT_MYSQL_PORT)),
            mysql_db: defaults.mysql_db.clone(),
            ..Self::default()
        }
    }
}

/// Parse the `[defaults]` section
pub fn parse_defaults(raw: &Value) -> Result<DefaultsRecord, ValidationError> {
    const SECTION: &str = "defaults";

    let map = match raw {
        Value::Null => return Ok(DefaultsRecord::default()),
        Value::Mapping(map) => map,
        other => return Err(not_a_mapping(SECTION, SECTION, other)),
    };

    let mut defaults = DefaultsRecord::default();
    for (key, value) in map {
        match key.as_str() {
            "etcd_node" => defaults.etcd_node = string_field(SECTION, key, value)?,
            "etcd_port" => defaults.etcd_port = port_field(SECTION, key, value)?,
            "http_header" => defaults.http_header = string_field(SECTION, key, value)?,
            "http_format" => defaults.http_format = string_field(SECTION, key, value)?,
            "mysql_user" => defaults.mysql_user = string_field(SECTION, key, value)?,
            "mysql_pass" => defaults.mysql_pass = string_field(SECTION, key, value)?.map(Secret::new),
            "mysql_host" => defaults.mysql_host = string_field(SECTION, key, value)?,
            "mysql_port" => defaults.mysql_port = port_field(SECTION, key, value)?,
            "mysql_db" => defaults.mysql_db = string_field(SECTION, key, value)?,
            other => {
                return Err(ValidationError::UnknownField {
                    section: SECTION.to_string(),
                    field: other.to_string(),
                })
            }
        }
    }

    Ok(defaults)
}

/// Resolve one `[inputs.<name>]` entry into an [`InputSpec`].
///
/// Built-in defaults and the `[defaults]` record are applied first, then every
/// explicit field; an explicit null clears a default. Required fields are
/// checked per type in a fixed order and the first missing one is reported.
pub fn resolve_input(
    name: &str,
    raw: &Value,
    defaults: &DefaultsRecord,
) -> Result<InputSpec, ValidationError> {
    let section = format!("inputs.{}", name);
    let map = raw.as_mapping().ok_or_else(|| not_a_mapping(&section, name, raw))?;

    let mut f = Fields::seeded(defaults);
    f.name = Some(name.to_string());

    for (key, value) in map {
        match key.as_str() {
            "name" => f.name = string_field(&section, key, value)?,
            "type" => f.kind = string_field(&section, key, value)?,
            "path" => f.path = string_field(&section, key, value)?,
            "etcd_node" => f.etcd_node = string_field(&section, key, value)?,
            "etcd_port" => f.etcd_port = port_field(&section, key, value)?,
            "etcd_dir" => f.etcd_dir = string_field(&section, key, value)?,
            "http_url" => f.http_url = string_field(&section, key, value)?,
            "http_header" => f.http_header = string_field(&section, key, value)?,
            "http_format" => f.http_format = string_field(&section, key, value)?,
            "mysql_user" => f.mysql_user = string_field(&section, key, value)?,
            "mysql_pass" => f.mysql_pass = string_field(&section, key, value)?.map(Secret::new),
            "mysql_host" => f.mysql_host = string_field(&section, key, value)?,
            "mysql_port" => f.mysql_port = port_field(&section, key, value)?,
            "mysql_db" => f.mysql_db = string_field(&section, key, value)?,
            "mysql_qry" => f.mysql_qry = string_field(&section, key, value)?,
            other => {
                return Err(ValidationError::UnknownField {
                    section,
                    field: other.to_string(),
                })
            }
        }
    }

    let kind = required(name, "type", f.kind)?;
    let source = match kind.as_str() {
        "file" => SourceSpec::File {
            path: PathBuf::from(required(name, "path", f.path)?),
        },
        "etcd" => SourceSpec::Etcd {
            host: required(name, "etcd_node", f.etcd_node)?,
            port: required(name, "etcd_port", f.etcd_port)?,
            dir: f.etcd_dir.unwrap_or_else(|| DEFAULT_ETCD_DIR.to_string()),
        },
        "http" => {
            let url = required(name, "http_url", f.http_url)?;
            let header = required(name, "http_header", f.http_header)?;
            let format = required(name, "http_format", f.http_format)?;

            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(invalid(&section, "http_url", "must start with http:// or https://"));
            }
            if split_header(&header).is_none() {
                return Err(invalid(&section, "http_header", "expected \"Name: value\""));
            }

            SourceSpec::Http { url, header, format }
        }
        "mysql" => SourceSpec::Mysql(MysqlSource {
            user: required(name, "mysql_user", f.mysql_user)?,
            password: required(name, "mysql_pass", f.mysql_pass)?,
            host: required(name, "mysql_host", f.mysql_host)?,
            port: required(name, "mysql_port", f.mysql_port)?,
            database: required(name, "mysql_db", f.mysql_db)?,
            query: required(name, "mysql_qry", f.mysql_qry)?,
        }),
        other => {
            return Err(ValidationError::UnknownType {
                input: name.to_string(),
                kind: other.to_string(),
            })
        }
    };

    let name = required(name, "name", f.name)?;
    Ok(InputSpec { name, source })
}

/// Parse one `[merge.<key>]` directive
pub fn parse_merge(key: &str, raw: &Value) -> Result<MergeSpec, ValidationError> {
    let section = format!("merge.{}", key);
    let map = raw.as_mapping().ok_or_else(|| not_a_mapping(&section, key, raw))?;

    let mut name = key.to_string();
    let mut inputs = None;

    for (field, value) in map {
        match field.as_str() {
            "name" => match value {
                Value::String(s) => name = s.clone(),
                other => return Err(expected(&section, field, "a string", other)),
            },
            "inputs" => {
                let items = value
                    .as_list()
                    .ok_or_else(|| expected(&section, field, "a list of input names", value))?;
                let names = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| expected(&section, field, "a list of input names", item))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                inputs = Some(names);
            }
            other => {
                return Err(ValidationError::UnknownField {
                    section,
                    field: other.to_string(),
                })
            }
        }
    }

    let inputs = inputs.ok_or_else(|| invalid(&section, "inputs", "a list of input names is required"))?;
    Ok(MergeSpec { key: key.to_string(), name, inputs })
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration document.
    ///
    /// Every input and merge directive is checked independently and every
    /// problem lands in `report`; entries that fail are left out of the
    /// returned config.
    pub fn validate(document: &Value, report: &mut ValidationReport) -> PipelineConfig {
        let defaults = match document.get("defaults") {
            None => DefaultsRecord::default(),
            Some(raw) => parse_defaults(raw).unwrap_or_else(|e| {
                report.add_error(e);
                DefaultsRecord::default()
            }),
        };

        let inputs = Self::validate_inputs(document, &defaults, report);
        let merges = Self::validate_merges(document, report);

        PipelineConfig { defaults, inputs, merges, document: document.clone() }
    }

    fn validate_inputs(
        document: &Value,
        defaults: &DefaultsRecord,
        report: &mut ValidationReport,
    ) -> Vec<InputSpec> {
        let Some(raw_inputs) = document.get("inputs").and_then(Value::as_mapping) else {
            report.add_error(ValidationError::MissingSection { section: "inputs".to_string() });
            return Vec::new();
        };

        if raw_inputs.is_empty() {
            report.add_warning("inputs", "No inputs defined, only Env, Arg, File and Cfg will be available");
        }

        let mut inputs = Vec::with_capacity(raw_inputs.len());
        for (name, raw) in raw_inputs {
            match resolve_input(name, raw, defaults) {
                Ok(spec) => inputs.push(spec),
                Err(e) => report.add_error(e),
            }
        }
        inputs
    }

    fn validate_merges(document: &Value, report: &mut ValidationReport) -> Vec<MergeSpec> {
        let raw_merges = match document.get("merge") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Mapping(map)) => map,
            Some(other) => {
                report.add_error(not_a_mapping("merge", "merge", other));
                return Vec::new();
            }
        };

        let mut merges = Vec::with_capacity(raw_merges.len());
        for (key, raw) in raw_merges {
            match parse_merge(key, raw) {
                Ok(spec) => {
                    if spec.inputs.is_empty() {
                        report.add_warning(
                            &format!("merge.{}", key),
                            "No inputs listed, destination will be an empty mapping",
                        );
                    }
                    merges.push(spec);
                }
                Err(e) => report.add_error(e),
            }
        }
        merges
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation warning
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }

    /// Fail with every collected error, if any
    pub fn into_result(self) -> Result<(), ResolveError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ResolveError::InvalidConfig(self.errors))
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

fn required<T>(input: &str, field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField {
        input: input.to_string(),
        field: field.to_string(),
    })
}

fn string_field(section: &str, field: &str, value: &Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(expected(section, field, "a string", other)),
    }
}

fn port_field(section: &str, field: &str, value: &Value) -> Result<Option<u16>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(n) => u16::try_from(*n)
            .ok()
            .filter(|port| *port != 0)
            .map(Some)
            .ok_or_else(|| invalid(section, field, &format!("port {} out of range", n))),
        other => Err(expected(section, field, "an integer port", other)),
    }
}

fn invalid(section: &str, field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        section: section.to_string(),
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn expected(section: &str, field: &str, what: &str, found: &Value) -> ValidationError {
    invalid(section, field, &format!("expected {}, found {}", what, found.kind()))
}

fn not_a_mapping(section: &str, field: &str, found: &Value) -> ValidationError {
    expected(section, field, "a mapping", found)
}
