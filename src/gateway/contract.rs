//! SkillAttestation contract interface (fixed ABI)

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract SkillAttestation {
        struct Attestation {
            address attester;
            string skill;
            string description;
            uint256 timestamp;
        }

        /// Emitted for every accepted attestation.
        event SkillAttested(
            address indexed attester,
            address indexed subject,
            string skill,
            string description,
            uint256 timestamp
        );

        /// Record that the caller vouches for `subject`'s skill.
        function attestSkill(address subject, string calldata skill, string calldata description) external;

        /// All attestations recorded for a subject, in one call.
        function getAttestations(address subject) external view returns (Attestation[] memory);
    }
}
