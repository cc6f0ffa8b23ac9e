//! Operators, scientific functions and constants understood by the engine.
//!
//! Each set is closed: adding a member means adding a variant, and every
//! `match` below must then handle it.

use super::error::{CalcError, ensure_finite};
use std::fmt;

/// Largest integer whose factorial is still a finite `f64`.
pub const FACTORIAL_LIMIT: f64 = 170.0;

/// A binary operator applied eagerly against the pending operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
    ];

    /// Parse an operator key. Accepts both ASCII keys and display symbols.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" | "−" => Some(Self::Subtract),
            "*" | "×" => Some(Self::Multiply),
            "/" | "÷" => Some(Self::Divide),
            "^" => Some(Self::Power),
            _ => None,
        }
    }

    /// Symbol used in history expressions and the pending line.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "−",
            Self::Multiply => "×",
            Self::Divide => "÷",
            Self::Power => "^",
        }
    }

    /// Apply the operator to `a` and `b`.
    pub fn apply(&self, a: f64, b: f64) -> Result<f64, CalcError> {
        let value = match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                a / b
            }
            Self::Power => a.powf(b),
        };

        ensure_finite(value)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A unary scientific function applied to the current input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    /// Sine of an angle in degrees.
    Sin,
    /// Cosine of an angle in degrees.
    Cos,
    /// Tangent of an angle in degrees.
    Tan,
    /// Base-10 logarithm.
    Log,
    /// Natural logarithm.
    Ln,
    Factorial,
}

impl Function {
    pub const ALL: [Function; 7] = [
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Log,
        Self::Ln,
        Self::Factorial,
    ];

    /// Parse a function by name (case-insensitive). `!` is an alias for factorial.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sqrt" | "√" => Some(Self::Sqrt),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "log" => Some(Self::Log),
            "ln" => Some(Self::Ln),
            "factorial" | "fact" | "!" => Some(Self::Factorial),
            _ => None,
        }
    }

    /// Name used in history expressions, e.g. `factorial(5)`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Factorial => "factorial",
        }
    }

    /// Evaluate the function at `x`.
    pub fn evaluate(&self, x: f64) -> Result<f64, CalcError> {
        let value = match self {
            Self::Sqrt => {
                if x < 0.0 {
                    return Err(CalcError::InvalidInput);
                }
                x.sqrt()
            }
            Self::Sin => x.to_radians().sin(),
            Self::Cos => x.to_radians().cos(),
            Self::Tan => x.to_radians().tan(),
            Self::Log => {
                if x <= 0.0 {
                    return Err(CalcError::InvalidInput);
                }
                x.log10()
            }
            Self::Ln => {
                if x <= 0.0 {
                    return Err(CalcError::InvalidInput);
                }
                x.ln()
            }
            Self::Factorial => factorial(x)?,
        };

        ensure_finite(value)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn factorial(n: f64) -> Result<f64, CalcError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::InvalidInput);
    }
    if n > FACTORIAL_LIMIT {
        return Err(CalcError::Overflow);
    }

    // n is a whole number in 0..=170 here
    Ok((2..=n as u32).fold(1.0, |acc, i| acc * f64::from(i)))
}

/// A named constant that replaces the current input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub const ALL: [Constant; 2] = [Self::Pi, Self::E];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pi" | "π" => Some(Self::Pi),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "e",
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_operators() {
        assert_eq!(Operator::Add.apply(5.0, 3.0), Ok(8.0));
        assert_eq!(Operator::Subtract.apply(8.0, 2.0), Ok(6.0));
        assert_eq!(Operator::Multiply.apply(4.0, 2.5), Ok(10.0));
        assert_eq!(Operator::Divide.apply(9.0, 3.0), Ok(3.0));
        assert_eq!(Operator::Power.apply(2.0, 10.0), Ok(1024.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            Operator::Divide.apply(1.0, 0.0),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(
            Operator::Divide.apply(0.0, -0.0),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_power_out_of_range() {
        assert_eq!(Operator::Power.apply(10.0, 400.0), Err(CalcError::Overflow));
        assert_eq!(
            Operator::Power.apply(-8.0, 0.5),
            Err(CalcError::InvalidInput)
        );
    }

    #[test]
    fn test_operator_symbols() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("*"), Some(Operator::Multiply));
        assert_eq!(Operator::from_symbol("%"), None);
    }

    #[test]
    fn test_trig_uses_degrees() {
        assert!(approx(Function::Sin.evaluate(30.0).unwrap(), 0.5));
        assert!(approx(Function::Cos.evaluate(60.0).unwrap(), 0.5));
        assert!(approx(Function::Tan.evaluate(45.0).unwrap(), 1.0));
    }

    #[test]
    fn test_logarithms() {
        assert!(approx(Function::Log.evaluate(1000.0).unwrap(), 3.0));
        assert!(approx(
            Function::Ln.evaluate(std::f64::consts::E).unwrap(),
            1.0
        ));
        assert_eq!(Function::Log.evaluate(0.0), Err(CalcError::InvalidInput));
        assert_eq!(Function::Ln.evaluate(-1.0), Err(CalcError::InvalidInput));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(Function::Sqrt.evaluate(16.0), Ok(4.0));
        assert_eq!(Function::Sqrt.evaluate(0.0), Ok(0.0));
        assert_eq!(Function::Sqrt.evaluate(-4.0), Err(CalcError::InvalidInput));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(Function::Factorial.evaluate(0.0), Ok(1.0));
        assert_eq!(Function::Factorial.evaluate(1.0), Ok(1.0));
        assert_eq!(Function::Factorial.evaluate(5.0), Ok(120.0));
        assert!(Function::Factorial.evaluate(170.0).unwrap().is_finite());
        assert_eq!(
            Function::Factorial.evaluate(171.0),
            Err(CalcError::Overflow)
        );
        assert_eq!(
            Function::Factorial.evaluate(2.5),
            Err(CalcError::InvalidInput)
        );
        assert_eq!(
            Function::Factorial.evaluate(-3.0),
            Err(CalcError::InvalidInput)
        );
    }

    #[test]
    fn test_function_names() {
        for func in Function::ALL {
            assert_eq!(Function::from_name(func.name()), Some(func));
        }
        assert_eq!(Function::from_name("!"), Some(Function::Factorial));
        assert_eq!(Function::from_name("SQRT"), Some(Function::Sqrt));
        assert_eq!(Function::from_name("exp"), None);
    }

    #[test]
    fn test_constants() {
        for constant in Constant::ALL {
            assert_eq!(Constant::from_name(constant.name()), Some(constant));
        }
        assert_eq!(Constant::Pi.value(), std::f64::consts::PI);
        assert_eq!(Constant::E.value(), std::f64::consts::E);
    }
}
