//! Weyr MCP Server
//!
//! Line-delimited JSON-RPC 2.0 over stdio. stdout carries protocol
//! messages only; logs go to stderr.
//!
//! Tools:
//! - jordan_form: Jordan canonical form of a rational matrix
//! - weyr: Rank sequence, Weyr characteristic and block counts for one eigenvalue
//! - call: Call any registered function by name
//! - list_functions: List available functions
//! - help: Get documentation for a function

mod config;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing_subscriber::EnvFilter;
use weyr_core::{Rational, Value};
use weyr_jordan::{standard_registry, BLOCK_ORDER_VAR};
use weyr_plugin::{EvalContext, PluginRegistry};

use config::ServerConfig;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "weyr";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn invalid_params(message: impl Into<String>) -> Self {
        McpError { code: -32602, message: message.into(), data: None }
    }
}

struct Server {
    registry: Arc<PluginRegistry>,
    config: ServerConfig,
}

impl Server {
    fn new(config: ServerConfig) -> Self {
        Server { registry: Arc::new(standard_registry()), config }
    }

    /// Fresh evaluation context carrying the configured limits
    fn context(&self) -> EvalContext {
        let mut ctx = EvalContext::new(self.registry.clone())
            .with_exact_limit(self.config.exact_limit);
        ctx.set_var(BLOCK_ORDER_VAR, Value::Text(self.config.block_order.as_str().to_string()));
        ctx
    }

    /// Read requests line by line until EOF, answering each one that has an id
    fn serve<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let Some(response) = self.handle_line(&line) else {
                continue;
            };
            let response_json = serde_json::to_string(&response)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }
        tracing::info!("client disconnected (EOF)");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        tracing::debug!(bytes = line.len(), "received");

        let request: McpRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "error parsing request");
                return Some(McpResponse {
                    jsonrpc: "2.0".to_string(),
                    id: None,
                    result: None,
                    error: Some(McpError {
                        code: -32700,
                        message: format!("Parse error: {}", e),
                        data: None,
                    }),
                });
            }
        };

        tracing::debug!(method = %request.method, "processing");
        let response = self.handle_request(&request);

        // Notifications (no id) should NOT receive a response
        if request.id.is_none() {
            tracing::debug!(method = %request.method, "notification processed (no response)");
            return None;
        }
        Some(response)
    }

    fn handle_request(&self, request: &McpRequest) -> McpResponse {
        let result = if request.jsonrpc != "2.0" {
            Err(McpError {
                code: -32600,
                message: format!("Invalid Request: unsupported jsonrpc version '{}'", request.jsonrpc),
                data: None,
            })
        } else {
            match request.method.as_str() {
                // Lifecycle
                "initialize" => handle_initialize(&request.params),
                "initialized" | "notifications/initialized" => Ok(json!({})),
                "ping" => Ok(json!({})),

                // Tools
                "tools/list" => handle_tools_list(),
                "tools/call" => self.handle_tool_call(&request.params),

                _ => Err(McpError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                }),
            }
        };

        match result {
            Ok(r) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id.clone(),
                result: Some(r),
                error: None,
            },
            Err(e) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id.clone(),
                result: None,
                error: Some(e),
            },
        }
    }

    fn handle_tool_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
        let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

        let name = params.get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

        let args = params.get("arguments").cloned().unwrap_or(json!({}));
        tracing::info!(tool = name, "tool call");

        match name {
            "jordan_form" => self.tool_jordan_form(&args),
            "weyr" => self.tool_weyr(&args),
            "call" => self.tool_call(&args),
            "list_functions" => self.tool_list_functions(&args),
            "help" => self.tool_help(&args),
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
        }
    }

    fn tool_jordan_form(&self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let matrix = args.get("matrix")
            .ok_or_else(|| McpError::invalid_params("Missing matrix argument"))?;

        let mut call_args = vec![json_to_value(matrix)];
        if let Some(order) = args.get("order").and_then(|v| v.as_str()) {
            call_args.push(Value::Text(order.to_string()));
        }

        let ctx = self.context();
        Ok(tool_result(&ctx.call("jordan_form", &call_args)))
    }

    fn tool_weyr(&self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let matrix = args.get("matrix")
            .ok_or_else(|| McpError::invalid_params("Missing matrix argument"))?;
        let eigenvalue = args.get("eigenvalue")
            .ok_or_else(|| McpError::invalid_params("Missing eigenvalue argument"))?;

        let ctx = self.context();
        Ok(tool_result(&ctx.call("weyr", &[json_to_value(matrix), json_to_value(eigenvalue)])))
    }

    fn tool_call(&self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let name = args.get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing name argument"))?;

        let call_args: Vec<Value> = match args.get("args") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items.iter().map(json_to_value).collect(),
            Some(_) => return Err(McpError::invalid_params("args must be an array")),
        };

        let ctx = self.context();
        Ok(tool_result(&ctx.call(name, &call_args)))
    }

    fn tool_list_functions(&self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let category = args.get("category").and_then(|v| v.as_str());
        let functions = self.registry.list_functions(category);
        let count = functions.as_list().map_or(0, |l| l.len());
        Ok(json!({
            "content": [{ "type": "text", "text": format!("{} functions listed", count) }],
            "data": value_to_json(&functions),
            "isError": false
        }))
    }

    fn tool_help(&self, args: &JsonValue) -> Result<JsonValue, McpError> {
        let name = args.get("name").and_then(|v| v.as_str());
        let help = self.registry.help(name);
        Ok(json!({
            "content": [{ "type": "text", "text": format_help(&help) }],
            "data": value_to_json(&help),
            "isError": help.is_error()
        }))
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}': {}; using info", filter, e);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let config = ServerConfig::from_env();
    init_tracing(&config.log_filter);

    tracing::info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Weyr MCP Server started");
    tracing::info!(
        exact_limit = config.exact_limit,
        block_order = config.block_order.as_str(),
        "configuration loaded"
    );

    let server = Server::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();

    if let Err(e) = server.serve(stdin.lock(), &mut stdout.lock()) {
        tracing::error!(error = %e, "I/O error, shutting down");
    }
    tracing::info!("Server shutting down");
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    tracing::info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Exact Jordan canonical forms via the Weyr characteristic"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Matrices are nested arrays of integers or exact fraction strings such as \"1/2\". Eigenvalues must be rational. Use 'jordan_form' for the canonical form, 'weyr' to inspect one eigenvalue, and 'help' to explore the other functions."
    }))
}

fn handle_tools_list() -> Result<JsonValue, McpError> {
    let matrix_schema = json!({
        "type": "array",
        "items": { "type": "array", "items": { "type": ["integer", "string"] } },
        "description": "Square matrix as rows; entries are integers or strings like \"-3/4\""
    });

    Ok(json!({
        "tools": [
            {
                "name": "jordan_form",
                "description": "Compute the exact Jordan canonical form. Blocks are grouped by ascending eigenvalue.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "matrix": matrix_schema,
                        "order": {
                            "type": "string",
                            "description": "Block order within an eigenvalue (default from server config)",
                            "enum": ["descending", "ascending"]
                        }
                    },
                    "required": ["matrix"]
                }
            },
            {
                "name": "weyr",
                "description": "Rank sequence of (A - λI)^p, Weyr characteristic, and Jordan block counts for one eigenvalue.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "matrix": matrix_schema,
                        "eigenvalue": {
                            "type": ["integer", "string"],
                            "description": "Eigenvalue λ, e.g. 2 or \"1/3\""
                        }
                    },
                    "required": ["matrix", "eigenvalue"]
                }
            },
            {
                "name": "call",
                "description": "Call any registered function by name with positional arguments.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Function name" },
                        "args": { "type": "array", "description": "Positional arguments" }
                    },
                    "required": ["name"]
                }
            },
            {
                "name": "list_functions",
                "description": "List all available functions, optionally by category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter: matrix, jordan (subcategories included)"
                        }
                    }
                }
            },
            {
                "name": "help",
                "description": "Get documentation for a function, or general help.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Function name. Omit for general help."
                        }
                    }
                }
            }
        ]
    }))
}

/// Wrap a registry result as MCP tool content
fn tool_result(value: &Value) -> JsonValue {
    match value {
        Value::Error(e) => json!({
            "content": [{ "type": "text", "text": format!("Error [{}]: {}", e.code, e.message) }],
            "error": {
                "code": e.code,
                "message": e.message,
                "suggestion": e.suggestion,
            },
            "isError": true
        }),
        other => json!({
            "content": [{ "type": "text", "text": other.to_string() }],
            "data": value_to_json(other),
            "isError": false
        }),
    }
}

fn format_help(help: &Value) -> String {
    match help {
        Value::Object(map) => {
            let mut out = String::new();
            if let Some(Value::Text(n)) = map.get("name") { out.push_str(&format!("# {}\n\n", n)); }
            if let Some(Value::Text(d)) = map.get("description") { out.push_str(&format!("{}\n\n", d)); }
            if let Some(Value::Text(u)) = map.get("usage") { out.push_str(&format!("**Usage:** `{}`\n\n", u)); }
            if let Some(Value::Object(cats)) = map.get("functions") {
                for (cat, names) in cats {
                    out.push_str(&format!("**{}:** {}\n", cat, names));
                }
            }
            out
        }
        Value::Error(e) => format!("Error: {}", e.message),
        _ => help.to_string(),
    }
}

fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() { Value::Number(Rational::from_i64(i)) }
            else { Value::Text(n.to_string()) }
        }
        JsonValue::String(s) => {
            match Rational::from_str(s) {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(s.clone()),
            }
        }
        JsonValue::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()),
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => match n.to_i64() {
            Some(i) => json!(i),
            None => JsonValue::String(n.to_string()),
        },
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::List(l) => JsonValue::Array(l.iter().map(value_to_json).collect()),
        Value::Object(o) => JsonValue::Object(o.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect()),
        Value::Error(e) => json!({"_error": {"code": e.code, "message": e.message}}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weyr_jordan::BlockOrder;

    fn server() -> Server {
        Server::new(ServerConfig::default())
    }

    fn roundtrip(server: &Server, request: JsonValue) -> JsonValue {
        let response = server.handle_line(&request.to_string()).expect("response expected");
        serde_json::to_value(&response).unwrap()
    }

    fn tool(server: &Server, name: &str, arguments: JsonValue) -> JsonValue {
        let response = roundtrip(server, json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }));
        response["result"].clone()
    }

    #[test]
    fn test_initialize() {
        let response = roundtrip(&server(), json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": { "protocolVersion": "2025-06-18", "clientInfo": { "name": "test" } }
        }));
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["protocolVersion"], json!("2025-06-18"));
        assert_eq!(response["result"]["serverInfo"]["name"], json!("weyr"));
    }

    #[test]
    fn test_tools_list_names() {
        let response = roundtrip(&server(), json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
        let names: Vec<&str> = response["result"]["tools"].as_array().unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["jordan_form", "weyr", "call", "list_functions", "help"]);
    }

    #[test]
    fn test_notification_gets_no_response() {
        let line = json!({"jsonrpc": "2.0", "method": "initialized"}).to_string();
        assert!(server().handle_line(&line).is_none());
        assert!(server().handle_line("   ").is_none());
    }

    #[test]
    fn test_parse_error() {
        let response = server().handle_line("{not json").unwrap();
        assert_eq!(response.error.map(|e| e.code), Some(-32700));
    }

    #[test]
    fn test_unknown_method() {
        let response = roundtrip(&server(), json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}));
        assert_eq!(response["error"]["code"], json!(-32601));
    }

    #[test]
    fn test_missing_params() {
        let response = roundtrip(&server(), json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call"}));
        assert_eq!(response["error"]["code"], json!(-32602));

        let response = roundtrip(&server(), json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": { "name": "jordan_form", "arguments": {} }
        }));
        assert_eq!(response["error"]["code"], json!(-32602));
    }

    #[test]
    fn test_jordan_form_tool() {
        let result = tool(&server(), "jordan_form", json!({ "matrix": [[1, 1], [-1, 3]] }));
        assert_eq!(result["isError"], json!(false));
        assert_eq!(result["data"]["data"], json!([[2, 1], [0, 2]]));
        assert_eq!(result["content"][0]["text"], json!("[[2, 1], [0, 2]]"));
    }

    #[test]
    fn test_jordan_form_tool_fraction_entries() {
        let result = tool(&server(), "jordan_form", json!({ "matrix": [["1/2", 1], [0, "1/2"]] }));
        assert_eq!(result["data"]["data"], json!([["1/2", 1], [0, "1/2"]]));
    }

    #[test]
    fn test_configured_block_order() {
        let config = ServerConfig { block_order: BlockOrder::Ascending, ..ServerConfig::default() };
        let s = Server::new(config);
        let a = json!([[0, 0, 0], [0, 0, 1], [0, 0, 0]]);
        let result = tool(&s, "jordan_form", json!({ "matrix": a }));
        assert_eq!(result["data"]["data"], a);

        let result = tool(&s, "jordan_form", json!({ "matrix": a, "order": "descending" }));
        assert_eq!(result["data"]["data"], json!([[0, 1, 0], [0, 0, 0], [0, 0, 0]]));
    }

    #[test]
    fn test_weyr_tool() {
        let result = tool(&server(), "weyr", json!({ "matrix": [[2, 1], [0, 2]], "eigenvalue": 2 }));
        assert_eq!(result["data"]["ranks"], json!([2, 1, 0, 0]));
        assert_eq!(result["data"]["weyr"], json!([1, 1]));
    }

    #[test]
    fn test_tool_errors_are_flagged() {
        let result = tool(&server(), "weyr", json!({ "matrix": [[2, 1], [0, 2]], "eigenvalue": 5 }));
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["error"]["code"], json!("NOT_EIGENVALUE"));

        let result = tool(&server(), "jordan_form", json!({ "matrix": [[1, 2, 3]] }));
        assert_eq!(result["error"]["code"], json!("NOT_SQUARE"));
    }

    #[test]
    fn test_exact_limit_from_config() {
        let config = ServerConfig { exact_limit: 2, ..ServerConfig::default() };
        let result = tool(&Server::new(config), "jordan_form", json!({ "matrix": [[1, 0, 0], [0, 1, 0], [0, 0, 1]] }));
        assert_eq!(result["error"]["code"], json!("DIMENSION_LIMIT"));
    }

    #[test]
    fn test_call_tool() {
        let result = tool(&server(), "call", json!({ "name": "jordan_block", "args": [3, 2] }));
        assert_eq!(result["data"]["data"], json!([[3, 1], [0, 3]]));

        let result = tool(&server(), "call", json!({ "name": "no_such_fn", "args": [] }));
        assert_eq!(result["error"]["code"], json!("UNDEFINED_FUNC"));
    }

    #[test]
    fn test_list_functions_and_help() {
        let result = tool(&server(), "list_functions", json!({ "category": "jordan" }));
        let names: Vec<&str> = result["data"].as_array().unwrap()
            .iter()
            .filter_map(|f| f["name"].as_str())
            .collect();
        assert_eq!(names, vec!["direct_sum", "jordan_block", "jordan_form", "jordan_structure", "weyr"]);

        let help = tool(&server(), "help", json!({ "name": "weyr" }));
        assert_eq!(help["isError"], json!(false));
        assert!(help["content"][0]["text"].as_str().unwrap().starts_with("# weyr"));
    }

    #[test]
    fn test_serve_loop() {
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
            json!({"jsonrpc": "2.0", "method": "initialized"}).to_string(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}).to_string(),
        ].join("\n");
        let mut output = Vec::new();
        server().serve(io::Cursor::new(input), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: JsonValue = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["id"], json!(2));
    }
}
