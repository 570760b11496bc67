//! Outbound command encoding

/// Terminates the argument list of a call command
const END_COMMAND_PART: &str = "e\n";

/// A typed argument of a call command
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Null,
}

impl Argument {
    /// Encode the argument as a single protocol line (without the newline)
    pub fn encode(&self) -> String {
        match self {
            Self::Integer(v) => format!("i{v}"),
            Self::Long(v) => format!("L{v}"),
            Self::Double(v) => format!("d{}", encode_double(*v)),
            Self::Boolean(v) => format!("b{v}"),
            Self::String(v) => format!("s{}", escape(v)),
            Self::Null => "n".to_string(),
        }
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Commands a client can send to the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Invoke `method` on the object identified by `target`
    Call {
        target: String,
        method: String,
        args: Vec<Argument>,
    },
    /// Authenticate the connection
    Auth { token: String },
}

impl Command {
    /// Create a call command
    pub fn call(target: impl Into<String>, method: impl Into<String>, args: Vec<Argument>) -> Self {
        Self::Call {
            target: target.into(),
            method: method.into(),
            args,
        }
    }

    /// Create an auth command
    pub fn auth(token: impl Into<String>) -> Self {
        Self::Auth {
            token: token.into(),
        }
    }

    /// Encode the command into its wire form, newlines included
    pub fn encode(&self) -> String {
        match self {
            Self::Call {
                target,
                method,
                args,
            } => {
                let mut out = String::with_capacity(16 + method.len() + args.len() * 8);
                out.push_str("c\n");
                out.push_str(target);
                out.push('\n');
                out.push_str(method);
                out.push('\n');
                for arg in args {
                    out.push_str(&arg.encode());
                    out.push('\n');
                }
                out.push_str(END_COMMAND_PART);
                out
            }
            // The gateway compares the token line verbatim.
            Self::Auth { token } => format!("A\n{token}\n"),
        }
    }
}

/// Java's `Double.parseDouble` needs a decimal point or exponent to keep
/// the value a double, and spells infinity out.
fn encode_double(value: f64) -> String {
    if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{value:?}")
    }
}

/// Escape a string so it fits on one protocol line
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
