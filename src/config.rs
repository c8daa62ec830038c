use crate::cli::EndpointArgs;

pub const DEFAULT_EMPLOYEE_ID: &str = "10005315";
pub const DEFAULT_FETCH_URL: &str = "https://imf44ag3d4.execute-api.ap-south-1.amazonaws.com/S1/Test5";
pub const DEFAULT_ADD_URL: &str = "https://bi3hh9apo0.execute-api.ap-south-1.amazonaws.com/S1/Addtask";
pub const DEFAULT_REMOVE_URL: &str = "https://oje3cr7sy2.execute-api.ap-south-1.amazonaws.com/V1/RemoveTask";

/// Session-wide settings: the employee being viewed and where the three endpoints live.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub employee_id: String,
    pub fetch_url: String,
    pub add_url: String,
    pub remove_url: String,
}

impl From<EndpointArgs> for Config {
    fn from(args: EndpointArgs) -> Self {
        Config {
            employee_id: args.employee_id,
            fetch_url: args.fetch_url,
            add_url: args.add_url,
            remove_url: args.remove_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_args_carry_over() {
        let args = EndpointArgs {
            employee_id: "99".to_string(),
            fetch_url: "http://a".to_string(),
            add_url: "http://b".to_string(),
            remove_url: "http://c".to_string(),
        };
        let config = Config::from(args);
        assert_eq!(config.employee_id, "99");
        assert_eq!(config.remove_url, "http://c");
    }
}
