//! Read-only views. Queries take the read lock and never fail except for
//! unknown ids.

use super::BountyBoardService;
use crate::domain::value_objects::{Address, ApplicationId, BountyId, SubmissionId};
use crate::errors::BountyError;
use crate::ports::inbound::{
    ApplicationInfo, BountyFilter, BountyInfo, ProfileInfo, ReputationInfo, SubmissionInfo,
};

impl BountyBoardService {
    pub(super) fn bounty_info(&self, id: BountyId) -> Result<BountyInfo, BountyError> {
        let state = self.state.read();
        Ok(BountyInfo::from(state.store.bounties.fetch(id)?))
    }

    pub(super) fn application_info(
        &self,
        id: ApplicationId,
    ) -> Result<ApplicationInfo, BountyError> {
        let state = self.state.read();
        Ok(ApplicationInfo::from(state.store.applications.fetch(id)?))
    }

    pub(super) fn submission_info(&self, id: SubmissionId) -> Result<SubmissionInfo, BountyError> {
        let state = self.state.read();
        Ok(SubmissionInfo::from(state.store.submissions.fetch(id)?))
    }

    pub(super) fn profile_info(&self, identity: Address) -> Result<ProfileInfo, BountyError> {
        let state = self.state.read();
        state
            .store
            .profile(&identity)
            .map(ProfileInfo::from)
            .ok_or(BountyError::ProfileNotFound(identity))
    }

    pub(super) fn reputation_info(&self, identity: Address) -> Option<ReputationInfo> {
        let state = self.state.read();
        state
            .ledger
            .get(&identity)
            .map(|record| ReputationInfo::new(identity, record))
    }

    pub(super) fn bounties_matching(&self, filter: BountyFilter) -> Vec<BountyInfo> {
        let state = self.state.read();
        state
            .store
            .bounties
            .iter()
            .filter(|b| filter.matches(b))
            .map(BountyInfo::from)
            .collect()
    }

    pub(super) fn applications_of_bounty(
        &self,
        bounty_id: BountyId,
    ) -> Result<Vec<ApplicationInfo>, BountyError> {
        let state = self.state.read();
        state.store.bounties.fetch(bounty_id)?;
        Ok(state
            .store
            .applications
            .iter()
            .filter(|a| a.bounty_id == bounty_id)
            .map(ApplicationInfo::from)
            .collect())
    }

    pub(super) fn applications_of_applicant(&self, applicant: Address) -> Vec<ApplicationInfo> {
        let state = self.state.read();
        state
            .store
            .applications
            .iter()
            .filter(|a| a.applicant == applicant)
            .map(ApplicationInfo::from)
            .collect()
    }

    pub(super) fn submissions_of_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<SubmissionInfo>, BountyError> {
        let state = self.state.read();
        state.store.applications.fetch(application_id)?;
        Ok(state
            .store
            .submissions
            .iter()
            .filter(|s| s.application_id == application_id)
            .map(SubmissionInfo::from)
            .collect())
    }
}
