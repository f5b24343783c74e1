use crate::errors::EdaError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

pub fn fmt_vec_output(v: &[f64]) -> String {
    let mut res = String::new();
    if let Some(last) = v.len().checked_sub(1) {
        if last == 0 {
            return format!("{:.4}", v[0]);
        }
        for n in &v[..last] {
            res.push_str(format!("{:.4}", n).as_str());
            res.push_str(", ");
        }
        res.push_str(format!("{:.4}", &v[last]).as_str());
    }
    res
}

// Validation
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), EdaError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(EdaError::InvalidParameter(parameter.to_string(), ex_msg, value.to_string()))
    } else {
        Ok(())
    }
}

pub fn validate_non_empty(values: &[f64], parameter: &str) -> Result<(), EdaError> {
    if values.is_empty() {
        Err(EdaError::InvalidParameter(
            parameter.to_string(),
            "a non empty sample".to_string(),
            "an empty sample".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
