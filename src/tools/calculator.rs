//! Pocket calculator
//!
//! Operations are applied left to right as they are entered, the way a
//! four-function calculator behaves: `2 + 3 * 4 =` gives 20.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' | 'x' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
            Operator::Div => '÷',
        }
    }

    fn apply(&self, lhs: f64, rhs: f64) -> Option<f64> {
        let result = match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div if rhs == 0.0 => return None,
            Operator::Div => lhs / rhs,
        };
        result.is_finite().then_some(result)
    }
}

#[derive(Debug, Clone)]
pub struct Calculator {
    display: String,
    accumulator: Option<f64>,
    pending: Option<Operator>,
    /// Next digit starts a new number instead of extending the display
    fresh: bool,
    error: bool,
    /// Last completed expression, shown above the display
    pub history: Option<String>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            accumulator: None,
            pending: None,
            fresh: true,
            error: false,
            history: None,
        }
    }
}

impl Calculator {
    pub fn display(&self) -> &str {
        if self.error {
            "Error"
        } else {
            &self.display
        }
    }

    pub fn pending(&self) -> Option<(String, Operator)> {
        Some((format_number(self.accumulator?)?, self.pending?))
    }

    /// Feed one key. Returns false for keys the calculator does not use.
    pub fn press(&mut self, c: char) -> bool {
        match c {
            '0'..='9' => self.digit(c),
            '.' | ',' => self.decimal_point(),
            '=' => self.equals(),
            'c' | 'C' => self.clear(),
            _ => match Operator::from_char(c) {
                Some(op) => self.operator(op),
                None => return false,
            },
        }
        true
    }

    pub fn digit(&mut self, d: char) {
        if self.error {
            self.clear();
        }
        if self.fresh || self.display == "0" {
            self.display = d.to_string();
            self.fresh = false;
        } else if self.display.len() < 16 {
            self.display.push(d);
        }
    }

    pub fn decimal_point(&mut self) {
        if self.error {
            self.clear();
        }
        if self.fresh {
            self.display = "0.".to_string();
            self.fresh = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    pub fn operator(&mut self, op: Operator) {
        if self.error {
            return;
        }
        if self.pending.is_some() && !self.fresh {
            self.evaluate();
            if self.error {
                return;
            }
        } else if self.pending.is_none() {
            self.accumulator = Some(self.value());
        }
        self.pending = Some(op);
        self.fresh = true;
    }

    pub fn equals(&mut self) {
        if self.error || self.pending.is_none() {
            return;
        }
        let expression = self
            .pending()
            .map(|(lhs, op)| format!("{} {} {} =", lhs, op.symbol(), self.display));
        self.evaluate();
        if !self.error {
            self.history = expression;
        }
        self.pending = None;
        self.fresh = true;
    }

    pub fn backspace(&mut self) {
        if self.error || self.fresh {
            return;
        }
        self.display.pop();
        if self.display.is_empty() || self.display == "-" {
            self.display = "0".to_string();
        }
    }

    pub fn clear(&mut self) {
        *self = Self {
            history: self.history.take(),
            ..Self::default()
        };
    }

    fn value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    fn evaluate(&mut self) {
        let (Some(lhs), Some(op)) = (self.accumulator, self.pending) else {
            return;
        };
        let result = op
            .apply(lhs, self.value())
            .and_then(|result| Some((result, format_number(result)?)));
        match result {
            Some((result, text)) => {
                self.accumulator = Some(result);
                self.display = text;
            }
            None => {
                self.error = true;
                self.accumulator = None;
            }
        }
        self.fresh = true;
    }
}

/// Render a result without trailing zeros or float noise.
/// `None` when the value is too large to display.
pub fn format_number(value: f64) -> Option<String> {
    let rounded = (value * 1e10).round() / 1e10;
    if !rounded.is_finite() {
        return None;
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        Some(format!("{}", rounded as i64))
    } else {
        let text = format!("{:.10}", rounded);
        Some(text.trim_end_matches('0').trim_end_matches('.').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(keys: &str) -> Calculator {
        let mut calc = Calculator::default();
        for c in keys.chars() {
            calc.press(c);
        }
        calc
    }

    #[test]
    fn test_left_to_right_evaluation() {
        assert_eq!(run("2+3*4=").display(), "20");
        assert_eq!(run("12-5=").display(), "7");
        assert_eq!(run("7/2=").display(), "3.5");
    }

    #[test]
    fn test_float_noise_is_hidden() {
        assert_eq!(run("0.1+0.2=").display(), "0.3");
        assert_eq!(run(".5*4=").display(), "2");
    }

    #[test]
    fn test_division_by_zero_shows_error_until_cleared() {
        let mut calc = run("5/0=");
        assert_eq!(calc.display(), "Error");
        calc.press('+');
        assert_eq!(calc.display(), "Error");
        calc.press('c');
        assert_eq!(calc.display(), "0");
        calc.press('4');
        assert_eq!(calc.display(), "4");
    }

    #[test]
    fn test_result_too_large_to_display_is_error() {
        let mut calc = run("9999999999999999*9999999999999999=");
        for _ in 0..17 {
            calc.press('*');
            for _ in 0..16 {
                calc.press('9');
            }
            calc.press('=');
        }
        assert_eq!(calc.display(), "Error");
        assert!(format_number(1e299).is_none());
        assert_eq!(format_number(2.5).as_deref(), Some("2.5"));
    }

    #[test]
    fn test_operator_replaces_pending_operator() {
        assert_eq!(run("9+-4=").display(), "5");
    }

    #[test]
    fn test_backspace_and_decimal() {
        let mut calc = run("12.5");
        calc.press('.');
        assert_eq!(calc.display(), "12.5");
        calc.backspace();
        calc.backspace();
        assert_eq!(calc.display(), "12");
        calc.backspace();
        calc.backspace();
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn test_history_records_last_expression() {
        let calc = run("6*7=");
        assert_eq!(calc.history.as_deref(), Some("6 × 7 ="));
        assert_eq!(calc.display(), "42");
        assert!(calc.pending().is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut calc = Calculator::default();
        assert!(!calc.press('q'));
        assert!(calc.press('='));
        assert_eq!(calc.display(), "0");
    }
}
