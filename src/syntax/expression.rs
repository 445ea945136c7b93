use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};

/// Parameter list and body shared by function literals, closure literals and
/// function declarations.
///
/// Held behind `Rc` so evaluating a literal never deep-copies its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    pub body: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Add,
    Sub,
    Mult,
    Div,
    Equals,
    LessThan,
    GreaterThan,
    LessEq,
    GreaterEq,
    And,
    Or,
    StringEqual,
    StringLess,
}

impl InfixOperator {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            InfixOperator::Add | InfixOperator::Sub | InfixOperator::Mult | InfixOperator::Div
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            InfixOperator::Equals
                | InfixOperator::LessThan
                | InfixOperator::GreaterThan
                | InfixOperator::LessEq
                | InfixOperator::GreaterEq
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Sub => "-",
            InfixOperator::Mult => "*",
            InfixOperator::Div => "/",
            InfixOperator::Equals => "==",
            InfixOperator::LessThan => "<",
            InfixOperator::GreaterThan => ">",
            InfixOperator::LessEq => "<=",
            InfixOperator::GreaterEq => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
            InfixOperator::StringEqual => "eq",
            InfixOperator::StringLess => "lt",
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Program tree consumed by both the interpreter and the code generator.
///
/// `Scope` nodes mark lexical blocks introduced by scope resolution; every
/// other variant is a language construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Integer {
        value: i32,
    },
    Float {
        value: f32,
    },
    Boolean {
        value: bool,
    },
    String {
        value: String,
    },
    Identifier {
        name: String,
    },
    Void,
    VarDecl {
        name: String,
    },
    FuncDecl {
        name: String,
        function: Rc<FunctionLiteral>,
    },
    Function {
        function: Rc<FunctionLiteral>,
    },
    Closure {
        function: Rc<FunctionLiteral>,
    },
    Scope {
        body: Box<Expression>,
    },
    Sequence {
        expressions: Vec<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Option<Box<Expression>>,
    },
    While {
        condition: Box<Expression>,
        body: Box<Expression>,
    },
    Return {
        value: Box<Expression>,
    },
    Print {
        value: Box<Expression>,
    },
    IsType {
        value: Box<Expression>,
        type_name: String,
    },
    StringLength {
        value: Box<Expression>,
    },
    Substring {
        value: Box<Expression>,
        start: Box<Expression>,
        end: Box<Expression>,
    },
    Object {
        fields: Vec<(String, Expression)>,
    },
    Field {
        object: Box<Expression>,
        name: String,
    },
}

impl Expression {
    /// Stable variant label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Integer { .. } => "Integer",
            Expression::Float { .. } => "Float",
            Expression::Boolean { .. } => "Boolean",
            Expression::String { .. } => "String",
            Expression::Identifier { .. } => "Identifier",
            Expression::Void => "Void",
            Expression::VarDecl { .. } => "VarDecl",
            Expression::FuncDecl { .. } => "FuncDecl",
            Expression::Function { .. } => "Function",
            Expression::Closure { .. } => "Closure",
            Expression::Scope { .. } => "Scope",
            Expression::Sequence { .. } => "Sequence",
            Expression::Not { .. } => "Not",
            Expression::Infix { operator, .. } => match operator {
                InfixOperator::Add => "Add",
                InfixOperator::Sub => "Sub",
                InfixOperator::Mult => "Mult",
                InfixOperator::Div => "Div",
                InfixOperator::Equals => "Equals",
                InfixOperator::LessThan => "LessThan",
                InfixOperator::GreaterThan => "GreaterThan",
                InfixOperator::LessEq => "LessEq",
                InfixOperator::GreaterEq => "GreaterEq",
                InfixOperator::And => "And",
                InfixOperator::Or => "Or",
                InfixOperator::StringEqual => "StringEqual",
                InfixOperator::StringLess => "StringLess",
            },
            Expression::Assign { .. } => "Assign",
            Expression::Call { .. } => "Call",
            Expression::If { .. } => "If",
            Expression::While { .. } => "While",
            Expression::Return { .. } => "Return",
            Expression::Print { .. } => "Print",
            Expression::IsType { .. } => "IsType",
            Expression::StringLength { .. } => "StringLength",
            Expression::Substring { .. } => "Substring",
            Expression::Object { .. } => "Object",
            Expression::Field { .. } => "Field",
        }
    }

    pub fn integer(value: i32) -> Self {
        Expression::Integer { value }
    }

    pub fn float(value: f32) -> Self {
        Expression::Float { value }
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Boolean { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::String {
            value: value.into(),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier { name: name.into() }
    }

    pub fn var_decl(name: impl Into<String>) -> Self {
        Expression::VarDecl { name: name.into() }
    }

    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn assign(target: Expression, value: Expression) -> Self {
        Expression::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// `VarDecl(name)` assigned in one step, the shape the static pass
    /// produces for `var name = value`.
    pub fn declare(name: impl Into<String>, value: Expression) -> Self {
        Expression::assign(Expression::var_decl(name), value)
    }

    pub fn sequence(expressions: Vec<Expression>) -> Self {
        Expression::Sequence { expressions }
    }

    pub fn scope(body: Expression) -> Self {
        Expression::Scope {
            body: Box::new(body),
        }
    }

    pub fn logical_not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            function: Box::new(function),
            arguments,
        }
    }

    pub fn if_else(
        condition: Expression,
        consequence: Expression,
        alternative: Option<Expression>,
    ) -> Self {
        Expression::If {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: alternative.map(Box::new),
        }
    }

    pub fn while_loop(condition: Expression, body: Expression) -> Self {
        Expression::While {
            condition: Box::new(condition),
            body: Box::new(body),
        }
    }

    pub fn ret(value: Expression) -> Self {
        Expression::Return {
            value: Box::new(value),
        }
    }

    pub fn print(value: Expression) -> Self {
        Expression::Print {
            value: Box::new(value),
        }
    }

    pub fn function(parameters: &[&str], body: Expression) -> Self {
        Expression::Function {
            function: FunctionLiteral::shared(parameters, body),
        }
    }

    pub fn closure(parameters: &[&str], body: Expression) -> Self {
        Expression::Closure {
            function: FunctionLiteral::shared(parameters, body),
        }
    }

    pub fn func_decl(name: impl Into<String>, parameters: &[&str], body: Expression) -> Self {
        Expression::FuncDecl {
            name: name.into(),
            function: FunctionLiteral::shared(parameters, body),
        }
    }
}

impl FunctionLiteral {
    pub fn shared(parameters: &[&str], body: Expression) -> Rc<Self> {
        Rc::new(Self {
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            body,
        })
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.parameters.join(", "), self.body)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer { value } => write!(f, "{}", value),
            Expression::Float { value } => write!(f, "{:?}", value),
            Expression::Boolean { value } => write!(f, "{}", value),
            Expression::String { value } => write!(f, "\"{}\"", value),
            Expression::Identifier { name } => write!(f, "{}", name),
            Expression::Void => write!(f, "void"),
            Expression::VarDecl { name } => write!(f, "var {}", name),
            Expression::FuncDecl { name, function } => write!(f, "fun {}{}", name, function),
            Expression::Function { function } => write!(f, "fun{}", function),
            Expression::Closure { function } => write!(f, "closure{}", function),
            Expression::Scope { body } => write!(f, "{{ {} }}", body),
            Expression::Sequence { expressions } => {
                let items: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", items.join("; "))
            }
            Expression::Not { operand } => write!(f, "(!{})", operand),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Assign { target, value } => write!(f, "{} = {}", target, value),
            Expression::Call {
                function,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {{ {} }}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {{ {} }}", alt)?;
                }
                Ok(())
            }
            Expression::While { condition, body } => {
                write!(f, "while {} {{ {} }}", condition, body)
            }
            Expression::Return { value } => write!(f, "return {}", value),
            Expression::Print { value } => write!(f, "print({})", value),
            Expression::IsType { value, type_name } => write!(f, "({} is {})", value, type_name),
            Expression::StringLength { value } => write!(f, "length({})", value),
            Expression::Substring { value, start, end } => {
                write!(f, "substring({}, {}, {})", value, start, end)
            }
            Expression::Object { fields } => {
                let items: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Expression::Field { object, name } => write!(f, "{}.{}", object, name),
        }
    }
}
