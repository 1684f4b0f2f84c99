//! Fully-qualified gRPC method paths, as seen in `:path`.

pub const AUTH_REGISTER: &str = "/auth.v1.AuthService/Register";
pub const AUTH_LOGIN: &str = "/auth.v1.AuthService/Login";

pub const EMPLOYEE_CREATE: &str = "/employee.v1.EmployeeService/CreateEmployee";
pub const EMPLOYEE_GET: &str = "/employee.v1.EmployeeService/GetEmployee";
pub const EMPLOYEE_UPDATE: &str = "/employee.v1.EmployeeService/UpdateEmployee";
pub const EMPLOYEE_DELETE: &str = "/employee.v1.EmployeeService/DeleteEmployee";

pub const SALARY_NET: &str = "/salary.v1.SalaryService/CalculateNetSalary";
pub const SALARY_STATS_BY_COUNTRY: &str = "/salary.v1.SalaryService/GetSalaryStatsByCountry";
pub const SALARY_AVG_BY_JOB_TITLE: &str = "/salary.v1.SalaryService/GetAvgSalaryByJobTitle";

/// Methods callable without a credential. Every other path, including ones
/// no service implements, requires one.
pub const PUBLIC_METHODS: &[&str] = &[AUTH_REGISTER, AUTH_LOGIN];

/// Every method the roster services expose.
pub const ALL_METHODS: &[&str] = &[
    AUTH_REGISTER,
    AUTH_LOGIN,
    EMPLOYEE_CREATE,
    EMPLOYEE_GET,
    EMPLOYEE_UPDATE,
    EMPLOYEE_DELETE,
    SALARY_NET,
    SALARY_STATS_BY_COUNTRY,
    SALARY_AVG_BY_JOB_TITLE,
];
