//! # Contract Interface
//!
//! The fixed method set of the EduLoan contract: canonical signatures,
//! argument and return layouts, and whether a call carries value.

use crate::domain::abi::{self, ParamType, Token};
use crate::domain::services::function_selector;
use crate::errors::AbiError;

/// Static fields at the head of `students(address)`, before the loan-id list.
pub const STUDENT_DETAILS_FIELDS: usize = 8;

/// A method of the EduLoan contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractMethod {
    /// `registerStudent()`
    RegisterStudent,
    /// `requestLoan(uint256 amount, uint256 term, bool useCollateral)`
    RequestLoan,
    /// `approveLoan(uint256 loanId)` payable
    ApproveLoan,
    /// `makeRepayment(uint256 loanId)` payable
    MakeRepayment,
    /// `stake()` payable
    Stake,
    /// `updatePerformance(address student, uint256 courseId, uint256 score)`
    UpdatePerformance,
    /// `grantInstitutionRole(address)`
    GrantInstitutionRole,
    /// `grantAdminRole(address)`
    GrantAdminRole,
    /// `revokeInstitutionRole(address)`
    RevokeInstitutionRole,
    /// `revokeAdminRole(address)`
    RevokeAdminRole,
    /// `hasRole(bytes32 role, address account) -> bool`
    HasRole,
    /// `students(address) -> StudentRecord`
    Students,
    /// `loans(uint256) -> LoanRecord`
    Loans,
    /// `pause()`
    Pause,
    /// `unpause()`
    Unpause,
    /// `_calcInterestRate(address) -> uint256`
    CalcInterestRate,
    /// `_getNextPayment(uint256) -> uint256`
    GetNextPayment,
    /// `_checkMilestones(address)`
    CheckMilestones,
}

impl ContractMethod {
    /// Every method.
    pub const ALL: [ContractMethod; 18] = [
        ContractMethod::RegisterStudent,
        ContractMethod::RequestLoan,
        ContractMethod::ApproveLoan,
        ContractMethod::MakeRepayment,
        ContractMethod::Stake,
        ContractMethod::UpdatePerformance,
        ContractMethod::GrantInstitutionRole,
        ContractMethod::GrantAdminRole,
        ContractMethod::RevokeInstitutionRole,
        ContractMethod::RevokeAdminRole,
        ContractMethod::HasRole,
        ContractMethod::Students,
        ContractMethod::Loans,
        ContractMethod::Pause,
        ContractMethod::Unpause,
        ContractMethod::CalcInterestRate,
        ContractMethod::GetNextPayment,
        ContractMethod::CheckMilestones,
    ];

    /// Canonical signature used for the selector.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::RegisterStudent => "registerStudent()",
            Self::RequestLoan => "requestLoan(uint256,uint256,bool)",
            Self::ApproveLoan => "approveLoan(uint256)",
            Self::MakeRepayment => "makeRepayment(uint256)",
            Self::Stake => "stake()",
            Self::UpdatePerformance => "updatePerformance(address,uint256,uint256)",
            Self::GrantInstitutionRole => "grantInstitutionRole(address)",
            Self::GrantAdminRole => "grantAdminRole(address)",
            Self::RevokeInstitutionRole => "revokeInstitutionRole(address)",
            Self::RevokeAdminRole => "revokeAdminRole(address)",
            Self::HasRole => "hasRole(bytes32,address)",
            Self::Students => "students(address)",
            Self::Loans => "loans(uint256)",
            Self::Pause => "pause()",
            Self::Unpause => "unpause()",
            Self::CalcInterestRate => "_calcInterestRate(address)",
            Self::GetNextPayment => "_getNextPayment(uint256)",
            Self::CheckMilestones => "_checkMilestones(address)",
        }
    }

    /// Method name without the argument list.
    #[must_use]
    pub fn name(self) -> &'static str {
        let sig = self.signature();
        sig.split_once('(').map_or(sig, |(name, _)| name)
    }

    /// Four-byte function selector.
    #[must_use]
    pub fn selector(self) -> [u8; 4] {
        function_selector(self.signature())
    }

    /// Looks a method up by selector.
    pub fn from_selector(selector: [u8; 4]) -> Result<Self, AbiError> {
        Self::ALL
            .into_iter()
            .find(|m| m.selector() == selector)
            .ok_or(AbiError::UnknownSelector(selector))
    }

    /// Argument layout.
    #[must_use]
    pub fn inputs(self) -> Vec<ParamType> {
        use ParamType::{Address, Bool, FixedBytes32, Uint};
        match self {
            Self::RegisterStudent | Self::Stake | Self::Pause | Self::Unpause => vec![],
            Self::RequestLoan => vec![Uint(256), Uint(256), Bool],
            Self::ApproveLoan | Self::MakeRepayment | Self::Loans | Self::GetNextPayment => {
                vec![Uint(256)]
            }
            Self::UpdatePerformance => vec![Address, Uint(256), Uint(256)],
            Self::GrantInstitutionRole
            | Self::GrantAdminRole
            | Self::RevokeInstitutionRole
            | Self::RevokeAdminRole
            | Self::Students
            | Self::CalcInterestRate
            | Self::CheckMilestones => vec![Address],
            Self::HasRole => vec![FixedBytes32, Address],
        }
    }

    /// Return layout.
    #[must_use]
    pub fn outputs(self) -> Vec<ParamType> {
        use ParamType::{Address, Array, Bool, Uint};
        match self {
            Self::HasRole => vec![Bool],
            Self::Students => vec![
                Bool,      // isRegistered
                Uint(256), // creditScore
                Uint(256), // totalBorrowed
                Uint(256), // performanceScore
                Bool,      // isBlacklisted
                Uint(256), // stakedAmount
                Uint(256), // lastRewardsClaim
                Uint(256), // coursesCount
                Array(Box::new(Uint(256))), // loans
            ],
            Self::Loans => vec![
                Address,   // borrower
                Uint(256), // principal
                Uint(256), // remainingAmount
                Uint(256), // interestRate
                Uint(256), // term
                Uint(8),   // status
                Bool,      // isCollateralized
                Uint(256), // collateralAmount
                Uint(256), // milestone
            ],
            Self::CalcInterestRate | Self::GetNextPayment => vec![Uint(256)],
            _ => vec![],
        }
    }

    /// Returns true if the method accepts a transaction value.
    #[must_use]
    pub const fn is_payable(self) -> bool {
        matches!(self, Self::ApproveLoan | Self::MakeRepayment | Self::Stake)
    }

    /// Returns true for read-only methods (served by `eth_call`).
    #[must_use]
    pub const fn is_view(self) -> bool {
        matches!(
            self,
            Self::HasRole
                | Self::Students
                | Self::Loans
                | Self::CalcInterestRate
                | Self::GetNextPayment
        )
    }

    /// Encodes calldata for this method.
    #[must_use]
    pub fn encode_call(self, args: &[Token]) -> Vec<u8> {
        abi::encode_call(self.signature(), args)
    }

    /// Splits calldata into method and decoded arguments.
    pub fn decode_call(data: &[u8]) -> Result<(Self, Vec<Token>), AbiError> {
        let (selector, payload) = data.split_first_chunk::<4>().ok_or(AbiError::OutOfBounds {
            offset: 0,
            needed: 4,
            available: data.len(),
        })?;
        let method = Self::from_selector(*selector)?;
        let args = abi::decode(&method.inputs(), payload)?;
        Ok((method, args))
    }

    /// Decodes return data for this method.
    pub fn decode_output(self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        abi::decode(&self.outputs(), data)
    }

    /// Decodes only the first `count` return values. Anything after them,
    /// dynamic tails included, is not read.
    pub fn decode_output_head(self, data: &[u8], count: usize) -> Result<Vec<Token>, AbiError> {
        let outputs = self.outputs();
        abi::decode(&outputs[..count.min(outputs.len())], data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, U256};
    use std::collections::HashSet;

    #[test]
    fn test_selectors_are_unique() {
        let selectors: HashSet<_> = ContractMethod::ALL.iter().map(|m| m.selector()).collect();
        assert_eq!(selectors.len(), ContractMethod::ALL.len());
    }

    #[test]
    fn test_from_selector_round_trip() {
        for method in ContractMethod::ALL {
            assert_eq!(ContractMethod::from_selector(method.selector()), Ok(method));
        }
        assert!(ContractMethod::from_selector([0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(ContractMethod::RequestLoan.name(), "requestLoan");
        assert_eq!(ContractMethod::CalcInterestRate.name(), "_calcInterestRate");
    }

    #[test]
    fn test_payable_methods() {
        let payable: Vec<_> = ContractMethod::ALL
            .into_iter()
            .filter(|m| m.is_payable())
            .collect();
        assert_eq!(
            payable,
            vec![
                ContractMethod::ApproveLoan,
                ContractMethod::MakeRepayment,
                ContractMethod::Stake
            ]
        );
    }

    #[test]
    fn test_decode_call() {
        let student = Address::from_low_u64_be(9);
        let data = ContractMethod::UpdatePerformance.encode_call(&[
            Token::Address(student),
            Token::Uint(U256::from(3u64)),
            Token::Uint(U256::from(88u64)),
        ]);
        let (method, args) = ContractMethod::decode_call(&data).unwrap();
        assert_eq!(method, ContractMethod::UpdatePerformance);
        assert_eq!(args[0], Token::Address(student));
        assert_eq!(args[2], Token::Uint(U256::from(88u64)));
    }

    #[test]
    fn test_decode_call_rejects_truncated() {
        assert!(ContractMethod::decode_call(&[0x01, 0x02]).is_err());
    }

    #[test]
    fn test_student_head_decodes_without_loan_list() {
        let uint = |v: u64| Token::Uint(U256::from(v));
        let fields = vec![
            Token::Bool(true),
            uint(200),
            uint(0),
            uint(75),
            Token::Bool(false),
            uint(0),
            uint(0),
            uint(2),
        ];
        let data = abi::encode(&fields);
        assert_eq!(data.len(), STUDENT_DETAILS_FIELDS * abi::WORD);

        assert!(ContractMethod::Students.decode_output(&data).is_err());
        let head = ContractMethod::Students
            .decode_output_head(&data, STUDENT_DETAILS_FIELDS)
            .unwrap();
        assert_eq!(head, fields);
    }
}
